/// Internet checksum (RFC 1071) of an ICMP message.
///
/// The checksum field (bytes 2..4) is skipped, so `data` may carry a stale value there. A
/// trailing odd byte is the high byte of a zero-padded word.
pub fn checksum(data: &[u8]) -> u16 {
    pnet_packet::util::checksum(data, 1)
}
