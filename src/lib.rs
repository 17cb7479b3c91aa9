#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! ICMP echo probes to a single destination.
//!
//! A [`Ping`] opens one ICMP datagram socket, sends a bounded number of echo requests and
//! reports each latency or timeout to a [`PingListener`]. Name resolution is left to the
//! caller.

pub use ping::{Ping, State};
pub use ping_config::{PingConfig, DEFAULT_DELAY, DEFAULT_TIMEOUT};
pub use ping_error::{PingError, PingErrorKind};
pub use ping_listener::{PingListener, ProbeOutcome, TIMED_OUT_MS};
pub use ping_result::PingResult;
pub use probe_count::{ProbeCount, DEFAULT_COUNT};
pub use socket::Network;

pub mod icmp;
mod ping;
mod ping_config;
mod ping_error;
mod ping_listener;
mod ping_result;
mod probe_count;
pub mod socket;
