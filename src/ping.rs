use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::icmp::{EchoPacketBuilder, EchoReply, IcmpVersion, HEADER_SIZE};
use crate::ping_config::millis;
use crate::socket::{LowDelay, Network, Platform, SystemPlatform, TSocket};
use crate::*;

/// ICMP datagram sockets ignore the port, but the destination still carries one.
const ECHO_PORT: u16 = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Idle,
    SocketOpen,
    Probing,
    /// Finished normally; the socket is released.
    Closed,
    /// Ended by a fatal error; the socket, if any, is released.
    Aborted,
}

/// Sends a bounded sequence of echo requests to one destination.
///
/// `run` blocks the calling thread until all probes are done, the run is cancelled through
/// [`ProbeCount`], or a fatal error occurs. A `Ping` runs at most once.
pub struct Ping<L, P = SystemPlatform> {
    states: Vec<State>,
    dest: IpAddr,
    listener: L,
    platform: P,
    timeout: Duration,
    delay: Duration,
    count: ProbeCount,
    network: Option<Network>,
    echo_packet_builder: EchoPacketBuilder,
}

impl<L> Ping<L, SystemPlatform>
where
    L: PingListener,
{
    pub fn new(dest: IpAddr, listener: L) -> Self {
        let config = PingConfig::default();
        Ping {
            states: vec![State::Idle],
            dest,
            listener,
            platform: SystemPlatform,
            timeout: config.timeout,
            delay: config.delay,
            count: ProbeCount::new(config.count),
            network: config.network,
            echo_packet_builder: EchoPacketBuilder::with_default_payload(IcmpVersion::from(dest)),
        }
    }

    pub fn with_config(dest: IpAddr, listener: L, config: PingConfig) -> PingResult<Self> {
        Self::with_platform(dest, listener, config, SystemPlatform)
    }
}

impl<L, P> Ping<L, P>
where
    L: PingListener,
    P: Platform,
{
    pub fn with_platform(dest: IpAddr, listener: L, config: PingConfig, platform: P) -> PingResult<Self> {
        config.validate()?;
        let echo_packet_builder = EchoPacketBuilder::new(IcmpVersion::from(dest), Some(config.payload.as_slice()))?;
        Ok(Ping {
            states: vec![State::Idle],
            dest,
            listener,
            platform,
            timeout: config.timeout,
            delay: config.delay,
            count: ProbeCount::new(config.count),
            network: config.network,
            echo_packet_builder,
        })
    }

    pub fn dest(&self) -> IpAddr {
        self.dest
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: i64) -> PingResult<()> {
        self.timeout = millis("timeout", timeout_ms)?;
        Ok(())
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_delay_ms(&mut self, delay_ms: i64) -> PingResult<()> {
        self.delay = millis("delay", delay_ms)?;
        Ok(())
    }

    pub fn delay_ms(&self) -> u64 {
        u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_count(&self, count: u32) {
        self.count.set(count);
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    /// Handle for changing the count, and thereby cancelling, while `run` blocks.
    pub fn probe_count(&self) -> ProbeCount {
        self.count.clone()
    }

    pub fn set_network(&mut self, network: Option<Network>) {
        self.network = network;
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    /// Fails if the builder's ICMP version does not match the destination address.
    pub fn set_echo_packet_builder(&mut self, echo_packet_builder: EchoPacketBuilder) -> PingResult<()> {
        if echo_packet_builder.version() != IcmpVersion::from(self.dest) {
            return Err(PingError::invalid_argument(format!(
                "echo packet builder for {:?} does not match destination {}",
                echo_packet_builder.version(),
                self.dest
            )));
        }
        self.echo_packet_builder = echo_packet_builder;
        Ok(())
    }

    pub fn echo_packet_builder(&self) -> &EchoPacketBuilder {
        &self.echo_packet_builder
    }

    pub fn echo_packet_builder_mut(&mut self) -> &mut EchoPacketBuilder {
        &mut self.echo_packet_builder
    }

    pub fn get_states(&self) -> Vec<State> {
        self.states.clone()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Probes the destination and reports every outcome to the listener.
    ///
    /// Returns the terminal state. Calling `run` again after a run is a no-op that returns
    /// the same terminal state.
    pub fn run(&mut self) -> State {
        if !self.is_in_state(State::Idle) {
            tracing::warn!("Ping::run() called on a finished ping, ignoring");
            return self.state();
        }

        let version = IcmpVersion::from(self.dest);
        let state = match self.platform.open_socket(version) {
            Err(e) => self.abort(PingError::io(PingErrorKind::SocketCreate, "socket() failed", e), 0),
            Ok(socket) => {
                self.states.push(State::SocketOpen);
                let state = self.run_with_socket(&socket);
                // Dropping the socket closes it, on every path out of `run_with_socket`.
                drop(socket);
                state
            }
        };
        tracing::debug!("ping to {} finished: {:?}", self.dest, state);
        self.states.push(state);
        state
    }

    fn run_with_socket(&mut self, socket: &P::Socket) -> State {
        if !socket.is_valid() {
            return self.abort(PingError::new(PingErrorKind::InvalidSocket, "invalid socket descriptor"), 0);
        }
        if let Some(network) = &self.network {
            if let Err(e) = socket.bind_to_network(network) {
                let error = PingError::io(PingErrorKind::Bind, format!("could not bind socket to network {network}"), e);
                return self.abort(error, 0);
            }
            tracing::trace!("socket bound to network {}", network);
        }
        if let LowDelay::Unsupported(e) = socket.set_low_delay() {
            tracing::debug!("could not set low delay traffic class: {}", e);
        }

        self.states.push(State::Probing);
        let addr = SocketAddr::new(self.dest, ECHO_PORT);
        let mut buffer = vec![0u8; HEADER_SIZE + self.echo_packet_builder.payload().len()];
        let mut index: u32 = 0;
        // The count is re-read every iteration; this is where cancellation takes effect.
        while index < self.count.get() {
            match self.probe(socket, &addr, &mut buffer) {
                Ok(outcome) => {
                    tracing::debug!("probe #{} to {}: {:?}", index, self.dest, outcome);
                    self.listener.on_ping(outcome, index);
                }
                Err(e) => return self.abort(e, index),
            }
            self.platform.sleep(self.delay);
            index += 1;
        }
        State::Closed
    }

    fn probe(&mut self, socket: &P::Socket, addr: &SocketAddr, buffer: &mut [u8]) -> PingResult<ProbeOutcome> {
        let packet = self.echo_packet_builder.build();

        let start = self.platform.now();
        socket
            .send_to(&packet, addr)
            .map_err(|e| PingError::io(PingErrorKind::Send, "sendto() failed", e))?;
        let ready = socket
            .poll_readable(self.timeout)
            .map_err(|e| PingError::io(PingErrorKind::Poll, "poll() failed", e))?;
        let end = self.platform.now();

        if !ready {
            return Ok(ProbeOutcome::Timeout);
        }
        // The reply has arrived; the latency stands even if draining it fails.
        match socket.recv(buffer) {
            Ok(n) => self.trace_reply(&buffer[..n]),
            Err(e) => tracing::debug!("recvfrom() failed: {}", e),
        }
        Ok(ProbeOutcome::Reply(end.saturating_duration_since(start)))
    }

    fn trace_reply(&self, datagram: &[u8]) {
        match EchoReply::parse(self.echo_packet_builder.version(), datagram) {
            Some(reply) if reply.is_echo_reply(self.echo_packet_builder.version()) => tracing::trace!(
                "echo reply from {}: id={} seq={} payload={}",
                self.dest,
                reply.identifier,
                reply.sequence_number,
                reply.payload_size
            ),
            Some(reply) => tracing::trace!("unexpected ICMP type {} from {}", reply.icmp_type, self.dest),
            None => tracing::trace!("undecodable datagram of {} bytes from {}", datagram.len(), self.dest),
        }
    }

    fn abort(&mut self, error: PingError, index: u32) -> State {
        tracing::error!("ping to {} failed at probe #{}: {}", self.dest, index, error);
        self.listener.on_ping_error(error, index);
        State::Aborted
    }

    fn state(&self) -> State {
        *self.states.last().unwrap_or(&State::Idle)
    }

    fn is_in_state(&self, state: State) -> bool {
        self.state() == state
    }
}
