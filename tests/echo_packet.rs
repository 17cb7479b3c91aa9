use echo_ping::icmp::{checksum, EchoPacketBuilder, IcmpVersion, IdentifierCounter, HEADER_SIZE, MAX_PAYLOAD};
use echo_ping::PingErrorKind;

// "0800 4d35 0001 0026 6162 6364 ..." as captured for id=1, seq=0x26.
const CAPTURE: &str = "0800 4d35 0001 0026 6162 6364 6566 6768 696a 6b6c 6d6e 6f70 7172 7374 7576 7761 6263 6465 6667 6869";

fn decode(hex: &str) -> Vec<u8> {
    hex.split_whitespace()
        .flat_map(|word| [&word[..2], &word[2..]])
        .map(|byte| u8::from_str_radix(byte, 16).unwrap())
        .collect()
}

#[test]
fn reference_capture() {
    let mut builder = EchoPacketBuilder::new(IcmpVersion::V4, Some(&b"abcdefghijklmnopqrstuvwabcdefghi"[..])).unwrap();
    builder.set_identifier(1);
    builder.set_sequence_number(0x26);
    builder.set_auto_identifier(false);

    assert_eq!(decode(CAPTURE), builder.build());
}

#[test]
fn checksum_round_trip() {
    let counter = IdentifierCounter::new(0x4242);
    for payload_len in [0usize, 1, 31, 32, 1471] {
        let payload: Vec<u8> = (0..payload_len).map(|i| (i % 251) as u8).collect();
        let mut builder =
            EchoPacketBuilder::new(IcmpVersion::V4, Some(payload.as_slice())).unwrap().with_identifier_counter(counter.clone());
        builder.set_sequence_number(7);

        let mut packet = builder.build();
        assert_eq!(HEADER_SIZE + payload_len, packet.len());

        let stored = u16::from_be_bytes([packet[2], packet[3]]);
        packet[2] = 0;
        packet[3] = 0;
        assert_eq!(stored, checksum(&packet));
    }
}

#[test]
fn payload_limit() {
    assert!(EchoPacketBuilder::new(IcmpVersion::V6, Some(vec![1u8; MAX_PAYLOAD].as_slice())).is_ok());
    let error = EchoPacketBuilder::new(IcmpVersion::V6, Some(vec![1u8; MAX_PAYLOAD + 1].as_slice())).unwrap_err();
    assert_eq!(PingErrorKind::InvalidArgument, error.kind);
}

#[test]
fn no_payload_is_header_only() {
    let mut builder = EchoPacketBuilder::new(IcmpVersion::V4, None).unwrap();
    assert_eq!(8, builder.build().len());
}
