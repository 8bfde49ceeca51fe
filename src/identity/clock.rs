use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in seconds since the epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 { chrono::Utc::now().timestamp() }
}

/// Settable clock for deterministic expiry checks.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now: i64) -> Self { Self(AtomicI64::new(now)) }
    pub fn advance(&self, secs: i64) { self.0.fetch_add(secs, Ordering::SeqCst); }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 { self.0.load(Ordering::SeqCst) }
}
