use crate::icmp::{DEFAULT_PAYLOAD, MAX_PAYLOAD};
use crate::probe_count::DEFAULT_COUNT;
use crate::socket::Network;
use crate::{PingError, PingResult};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug)]
pub struct PingConfig {
    /// How long to wait for a reply to each probe.
    pub timeout: Duration,
    /// Pause after each probe.
    pub delay: Duration,
    pub count: u32,
    pub network: Option<Network>,
    pub payload: Vec<u8>,
}

impl Default for PingConfig {
    fn default() -> Self {
        PingConfig {
            timeout: DEFAULT_TIMEOUT,
            delay: DEFAULT_DELAY,
            count: DEFAULT_COUNT,
            network: None,
            payload: DEFAULT_PAYLOAD.to_vec(),
        }
    }
}

impl PingConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> PingResult<Self> {
        self.timeout = millis("timeout", timeout_ms)?;
        Ok(self)
    }

    pub fn with_delay_ms(mut self, delay_ms: i64) -> PingResult<Self> {
        self.delay = millis("delay", delay_ms)?;
        Ok(self)
    }

    pub fn validate(&self) -> PingResult<()> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(PingError::invalid_argument(format!(
                "payload of {} bytes exceeds {} bytes",
                self.payload.len(),
                MAX_PAYLOAD
            )));
        }
        Ok(())
    }
}

/// Negative values are rejected, never clamped.
pub(crate) fn millis(what: &str, value: i64) -> PingResult<Duration> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| PingError::invalid_argument(format!("{what} must not be negative: {value}")))
}
