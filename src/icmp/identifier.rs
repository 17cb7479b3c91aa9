use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, OnceLock};

/// Source of echo identifiers shared between builders.
///
/// Clones share the same counter. Builders created without an explicit counter draw from
/// [`IdentifierCounter::global`], so identifiers of concurrent builders interleave. Only
/// uniqueness matters, not ordering.
#[derive(Clone, Debug, Default)]
pub struct IdentifierCounter(Arc<AtomicU16>);

static GLOBAL: OnceLock<IdentifierCounter> = OnceLock::new();

impl IdentifierCounter {
    pub fn new(start: u16) -> Self {
        IdentifierCounter(Arc::new(AtomicU16::new(start)))
    }

    /// The process-wide counter, starting at 0.
    pub fn global() -> Self {
        GLOBAL.get_or_init(IdentifierCounter::default).clone()
    }

    /// Returns the current value and increments, wrapping at `u16::MAX`.
    pub fn next(&self) -> u16 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    pub fn peek(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let counter = IdentifierCounter::new(7);
        let clone = counter.clone();
        assert_eq!(7, counter.next());
        assert_eq!(8, clone.next());
        assert_eq!(9, counter.peek());
    }

    #[test]
    fn wraps_around() {
        let counter = IdentifierCounter::new(u16::MAX);
        assert_eq!(u16::MAX, counter.next());
        assert_eq!(0, counter.next());
    }

    #[test]
    fn global_counter_is_shared() {
        let a = IdentifierCounter::global();
        let b = IdentifierCounter::global();
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn concurrent_draws_are_unique() {
        let counter = IdentifierCounter::new(0);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || (0..100).map(|_| counter.next()).collect::<Vec<u16>>())
            })
            .collect();
        let mut all: Vec<u16> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(400, all.len());
    }
}
