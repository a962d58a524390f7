use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic clock with nanosecond timestamps.
pub trait Timer: Clone + Send + Sync {
    /// Nanoseconds since the timer's origin.
    fn now(&self) -> u64;

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    /// Milliseconds between `ts` and now, with sub-millisecond precision.
    fn elapsed_ms(&self, ts: u64) -> f64 {
        self.now().saturating_sub(ts) as f64 / 1_000_000.0
    }
}

/// Wall-clock timer backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// The `Instant` corresponding to timestamp `ts`.
    pub fn instant_at(&self, ts: u64) -> Instant {
        self.start + Duration::from_nanos(ts)
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

/// Clock that only moves when told to. Clones share the same time, so a
/// test can hold one handle while the code under test holds another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_clones_share_time() {
        let a = ManualTimer::new();
        let b = a.clone();
        a.advance_ms(300);
        assert_eq!(b.now(), 300_000_000);
        assert_eq!(b.elapsed_ms(100_000_000), 200.0);
        assert_eq!(b.elapsed(400_000_000), Duration::ZERO);
    }

    #[test]
    fn high_precision_timer_is_monotonic() {
        let t = HighPrecisionTimer::new();
        let first = t.now();
        let second = t.now();
        assert!(second >= first);
        assert!(t.instant_at(second) >= t.instant_at(first));
    }
}
