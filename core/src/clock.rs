//! Wall-clock capability.
//!
//! RULE: Nothing in the core reads platform time directly. Every
//! component that needs "now" takes a Clock, so tests drive time by
//! hand and the tick loop stays deterministic under replay.

use crate::types::{DurationMs, TimestampMs};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub trait Clock: Send {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> TimestampMs;
}

/// Production clock backed by system UTC time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Test clock advanced manually. Clones share the same underlying
/// instant, so a test can hold one handle while the engine owns another.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: TimestampMs) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: TimestampMs) {
        self.now.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: DurationMs) {
        self.now.fetch_add(delta_ms as i64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now.load(Ordering::Relaxed)
    }
}
