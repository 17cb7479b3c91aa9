use crate::icmp::IcmpVersion;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

pub(crate) mod dgram_socket;

pub use dgram_socket::{DgramSocket, SystemPlatform};

/// OS services the ping engine depends on.
pub trait Platform {
    type Socket: TSocket;

    fn open_socket(&self, version: IcmpVersion) -> io::Result<Self::Socket>;

    /// Blocks for `duration`. An early wake-up counts as a complete sleep.
    fn sleep(&self, duration: Duration);

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// An ICMP datagram socket. Dropping it closes it.
pub trait TSocket: Send {
    fn is_valid(&self) -> bool;
    fn bind_to_network(&self, network: &Network) -> io::Result<()>;
    fn set_low_delay(&self) -> LowDelay;
    fn send_to(&self, buf: &[u8], addr: &SocketAddr) -> io::Result<usize>;
    /// `Ok(false)` when nothing became readable within `timeout`.
    fn poll_readable(&self, timeout: Duration) -> io::Result<bool>;
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Result of asking for a low-delay traffic class.
#[derive(Debug)]
pub enum LowDelay {
    Applied,
    Unsupported(io::Error),
}

/// A network the socket is bound to before sending, identified by interface name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Network {
    interface: String,
}

impl Network {
    pub fn interface(name: impl Into<String>) -> Self {
        Network { interface: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.interface
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interface)
    }
}
