use std::net::IpAddr;

mod checksum;
mod echo_packet_builder;
mod echo_reply;
mod identifier;

pub use checksum::checksum;
pub use echo_packet_builder::{EchoPacketBuilder, DEFAULT_IDENTIFIER, DEFAULT_PAYLOAD, HEADER_SIZE, MAX_PAYLOAD};
pub use echo_reply::EchoReply;
pub use identifier::IdentifierCounter;

pub const TYPE_ECHO_REQUEST_V4: u8 = 8;
pub const TYPE_ECHO_REQUEST_V6: u8 = 128;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IcmpVersion {
    V4,
    V6,
}

impl IcmpVersion {
    pub fn echo_request_type(self) -> u8 {
        match self {
            IcmpVersion::V4 => TYPE_ECHO_REQUEST_V4,
            IcmpVersion::V6 => TYPE_ECHO_REQUEST_V6,
        }
    }
}

impl From<IpAddr> for IcmpVersion {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IcmpVersion::V4,
            IpAddr::V6(_) => IcmpVersion::V6,
        }
    }
}
