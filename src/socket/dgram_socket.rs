use super::{LowDelay, Network, Platform, TSocket};
use crate::icmp::IcmpVersion;
use socket2::{Domain, Protocol, Type};
use std::io;
use std::mem::MaybeUninit;
use std::net::SocketAddr;
use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};

const IPTOS_LOWDELAY: u32 = 0x10;

/// The real OS: ICMP datagram sockets and `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    type Socket = DgramSocket;

    fn open_socket(&self, version: IcmpVersion) -> io::Result<DgramSocket> {
        DgramSocket::new(version)
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Unprivileged ICMP socket (`SOCK_DGRAM`). Requires the process group to be covered by
/// `net.ipv4.ping_group_range` on Linux.
pub struct DgramSocket {
    socket: socket2::Socket,
    version: IcmpVersion,
}

impl DgramSocket {
    pub fn new(version: IcmpVersion) -> io::Result<Self> {
        tracing::trace!("creating DgramSocket for {:?}", version);
        let (domain, protocol) = match version {
            IcmpVersion::V4 => (Domain::IPV4, Protocol::ICMPV4),
            IcmpVersion::V6 => (Domain::IPV6, Protocol::ICMPV6),
        };
        let socket = socket2::Socket::new(domain, Type::DGRAM, Some(protocol))?;
        Ok(DgramSocket { socket, version })
    }
}

impl Drop for DgramSocket {
    fn drop(&mut self) {
        tracing::trace!("closing DgramSocket fd {}", self.socket.as_raw_fd());
    }
}

impl TSocket for DgramSocket {
    fn is_valid(&self) -> bool {
        self.socket.as_raw_fd() >= 0
    }

    #[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
    fn bind_to_network(&self, network: &Network) -> io::Result<()> {
        self.socket.bind_device(Some(network.name().as_bytes()))
    }

    #[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
    fn bind_to_network(&self, network: &Network) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("binding to network {network} is not supported on this platform"),
        ))
    }

    fn set_low_delay(&self) -> LowDelay {
        let result = match self.version {
            IcmpVersion::V4 => self.socket.set_tos(IPTOS_LOWDELAY),
            IcmpVersion::V6 => set_tclass_v6(&self.socket, IPTOS_LOWDELAY),
        };
        match result {
            Ok(()) => LowDelay::Applied,
            Err(e) => LowDelay::Unsupported(e),
        }
    }

    fn send_to(&self, buf: &[u8], addr: &SocketAddr) -> io::Result<usize> {
        self.socket.send_to(buf, &(*addr).into())
    }

    fn poll_readable(&self, timeout: Duration) -> io::Result<bool> {
        let fd = self.socket.as_raw_fd();
        poll_restarting(timeout, |remaining| {
            let mut fds = [libc::pollfd { fd, events: libc::POLLIN, revents: 0 }];
            let nfds: libc::nfds_t = 1;
            let timeout_ms = libc::c_int::try_from(remaining.as_millis()).unwrap_or(libc::c_int::MAX);
            // SAFETY: `fds` is a valid array of `nfds` pollfd entries for the duration of the call.
            let rc = unsafe { libc::poll(fds.as_mut_ptr(), nfds, timeout_ms) };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(rc > 0 && fds[0].revents & libc::POLLIN != 0)
        })
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        // Socket2 guarantees it never writes uninitialized bytes into the buffer, which makes
        // the cast from `&mut [u8]` to `&mut [MaybeUninit<u8>]` sound.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        //
        // On a DGRAM socket we get the ICMP message without the IP header.
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        self.socket.recv_with_flags(uninit, libc::MSG_DONTWAIT)
    }
}

/// Runs `poll_once` with the time left until `timeout`, again after every `EINTR`.
fn poll_restarting<F>(timeout: Duration, mut poll_once: F) -> io::Result<bool>
where
    F: FnMut(Duration) -> io::Result<bool>,
{
    let deadline = Instant::now().checked_add(timeout);
    let mut remaining = timeout;
    loop {
        match poll_once(remaining) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                tracing::trace!("poll() interrupted, restarting");
                if let Some(deadline) = deadline {
                    remaining = deadline.saturating_duration_since(Instant::now());
                }
            }
            result => return result,
        }
    }
}

#[cfg(any(target_os = "android", target_os = "linux", target_os = "macos", target_os = "ios"))]
fn set_tclass_v6(socket: &socket2::Socket, tclass: u32) -> io::Result<()> {
    let value = libc::c_int::try_from(tclass).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    #[allow(clippy::cast_possible_truncation)]
    let len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
    // SAFETY: the option value points to a live c_int of the given length.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::IPPROTO_IPV6,
            libc::IPV6_TCLASS,
            std::ptr::addr_of!(value).cast::<libc::c_void>(),
            len,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(any(target_os = "android", target_os = "linux", target_os = "macos", target_os = "ios")))]
fn set_tclass_v6(_socket: &socket2::Socket, _tclass: u32) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}
