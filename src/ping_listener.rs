use crate::PingError;
use std::time::Duration;

/// Latency reported for a probe that timed out, in the millisecond representation.
pub const TIMED_OUT_MS: i64 = -1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProbeOutcome {
    Reply(Duration),
    Timeout,
}

impl ProbeOutcome {
    /// Whole milliseconds, or [`TIMED_OUT_MS`].
    pub fn as_millis(&self) -> i64 {
        match self {
            ProbeOutcome::Reply(latency) => i64::try_from(latency.as_millis()).unwrap_or(i64::MAX),
            ProbeOutcome::Timeout => TIMED_OUT_MS,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeOutcome::Timeout)
    }
}

/// Receives the results of a [`crate::Ping`] run. Callbacks happen on the thread calling `run`.
pub trait PingListener {
    /// Called once per completed probe; `index` is 0-based.
    fn on_ping(&mut self, outcome: ProbeOutcome, index: u32);

    /// Called at most once per run, for the failure that ended it.
    fn on_ping_error(&mut self, error: PingError, index: u32);
}

impl<L: PingListener + ?Sized> PingListener for Box<L> {
    fn on_ping(&mut self, outcome: ProbeOutcome, index: u32) {
        (**self).on_ping(outcome, index);
    }

    fn on_ping_error(&mut self, error: PingError, index: u32) {
        (**self).on_ping_error(error, index);
    }
}
