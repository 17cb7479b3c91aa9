use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const DEFAULT_COUNT: u32 = 8;

/// Number of probes a [`crate::Ping`] run sends, shared between the engine and its controllers.
///
/// The engine re-reads the count before every probe, so lowering it (or calling
/// [`ProbeCount::cancel`]) from another thread or from a listener callback stops the run at
/// the next probe boundary. A probe already in flight completes.
#[derive(Clone, Debug)]
pub struct ProbeCount(Arc<AtomicU32>);

impl ProbeCount {
    pub fn new(count: u32) -> Self {
        ProbeCount(Arc::new(AtomicU32::new(count)))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, count: u32) {
        self.0.store(count, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        tracing::debug!("ping cancelled");
        self.set(0);
    }
}

impl Default for ProbeCount {
    fn default() -> Self {
        ProbeCount::new(DEFAULT_COUNT)
    }
}
