use super::{IcmpVersion, IdentifierCounter};
use crate::{PingError, PingResult};
use pnet_packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet_packet::icmp::{IcmpCode, IcmpPacket, IcmpType};
use pnet_packet::Packet;

/// Largest payload that still fits an IPv4 datagram (65535 - 20 - 8).
pub const MAX_PAYLOAD: usize = 65507;
pub const HEADER_SIZE: usize = 8;
/// Identifier used when auto-identifier is off and no identifier was set.
pub const DEFAULT_IDENTIFIER: u16 = 0x0DBB;
pub const DEFAULT_PAYLOAD: &[u8; 32] = b"abcdefghijklmnopqrstuvwabcdefghi";

const CODE: u8 = 0;

/// Builds ICMP Echo Request datagrams.
///
/// Layout: `[type, code, checksum (2), identifier (2), sequence number (2), payload...]`,
/// all multi-byte fields big-endian.
#[derive(Clone, Debug)]
pub struct EchoPacketBuilder {
    version: IcmpVersion,
    payload: Vec<u8>,
    sequence_number: u16,
    identifier: u16,
    auto_identifier: bool,
    identifiers: IdentifierCounter,
}

impl EchoPacketBuilder {
    /// A missing payload is treated as an empty one.
    pub fn new(version: IcmpVersion, payload: Option<&[u8]>) -> PingResult<Self> {
        let payload = payload.unwrap_or_default();
        if payload.len() > MAX_PAYLOAD {
            return Err(PingError::invalid_argument(format!(
                "payload limited to {MAX_PAYLOAD} bytes, got {}",
                payload.len()
            )));
        }
        Ok(Self::from_checked(version, payload.to_vec()))
    }

    /// Builder carrying [`DEFAULT_PAYLOAD`].
    pub fn with_default_payload(version: IcmpVersion) -> Self {
        Self::from_checked(version, DEFAULT_PAYLOAD.to_vec())
    }

    fn from_checked(version: IcmpVersion, payload: Vec<u8>) -> Self {
        EchoPacketBuilder {
            version,
            payload,
            sequence_number: 0,
            identifier: DEFAULT_IDENTIFIER,
            auto_identifier: true,
            identifiers: IdentifierCounter::global(),
        }
    }

    #[must_use]
    pub fn with_identifier_counter(mut self, identifiers: IdentifierCounter) -> Self {
        self.identifiers = identifiers;
        self
    }

    pub fn build(&mut self) -> Vec<u8> {
        if self.auto_identifier {
            self.identifier = self.identifiers.next();
        }

        let Some(packet) = self.encode() else {
            tracing::error!("could not encode echo request of {} bytes", HEADER_SIZE + self.payload.len());
            return Vec::new();
        };
        tracing::trace!(
            "built echo request: id={} seq={} len={}",
            self.identifier,
            self.sequence_number,
            packet.len()
        );
        packet
    }

    fn encode(&self) -> Option<Vec<u8>> {
        let buf = vec![0u8; HEADER_SIZE + self.payload.len()];
        let mut packet = MutableEchoRequestPacket::owned(buf)?;
        packet.set_icmp_type(IcmpType::new(self.version.echo_request_type()));
        packet.set_icmp_code(IcmpCode::new(CODE));
        packet.set_identifier(self.identifier);
        packet.set_sequence_number(self.sequence_number);
        packet.set_payload(&self.payload);

        let checksum = pnet_packet::icmp::checksum(&IcmpPacket::new(packet.packet())?);
        packet.set_checksum(checksum);
        Some(packet.packet().to_vec())
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        self.sequence_number = sequence_number;
    }

    /// Pins the identifier and turns auto-identifier off.
    pub fn set_identifier(&mut self, identifier: u16) {
        self.auto_identifier = false;
        self.identifier = identifier;
    }

    pub fn set_auto_identifier(&mut self, auto_identifier: bool) {
        self.auto_identifier = auto_identifier;
    }

    pub fn version(&self) -> IcmpVersion {
        self.version
    }

    /// The identifier of the most recently built packet, or the pinned one.
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn sequence_number(&self) -> u16 {
        self.sequence_number
    }

    pub fn auto_identifier(&self) -> bool {
        self.auto_identifier
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
