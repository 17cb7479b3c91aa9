use super::IcmpVersion;
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmpv6::Icmpv6Packet;
use pnet_packet::Packet;

pub const TYPE_ECHO_REPLY_V4: u8 = 0;
pub const TYPE_ECHO_REPLY_V6: u8 = 129;

/// Header fields of a datagram drained from an ICMP socket.
///
/// Only used for diagnostics; the probe outcome never depends on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EchoReply {
    pub icmp_type: u8,
    pub code: u8,
    pub identifier: u16,
    pub sequence_number: u16,
    pub payload_size: usize,
}

impl EchoReply {
    pub fn parse(version: IcmpVersion, bytes: &[u8]) -> Option<Self> {
        match version {
            IcmpVersion::V4 => {
                let package = EchoReplyPacket::new(bytes)?;
                Some(EchoReply {
                    icmp_type: package.get_icmp_type().0,
                    code: package.get_icmp_code().0,
                    identifier: package.get_identifier(),
                    sequence_number: package.get_sequence_number(),
                    payload_size: package.payload().len(),
                })
            }
            IcmpVersion::V6 => {
                let package = Icmpv6Packet::new(bytes)?;
                // identifier and sequence number lead the ICMPv6 message body
                let body = package.payload();
                if body.len() < 4 {
                    return None;
                }
                Some(EchoReply {
                    icmp_type: package.get_icmpv6_type().0,
                    code: package.get_icmpv6_code().0,
                    identifier: u16::from_be_bytes([body[0], body[1]]),
                    sequence_number: u16::from_be_bytes([body[2], body[3]]),
                    payload_size: body.len() - 4,
                })
            }
        }
    }

    pub fn is_echo_reply(&self, version: IcmpVersion) -> bool {
        let expected = match version {
            IcmpVersion::V4 => TYPE_ECHO_REPLY_V4,
            IcmpVersion::V6 => TYPE_ECHO_REPLY_V6,
        };
        self.icmp_type == expected && self.code == 0
    }
}
