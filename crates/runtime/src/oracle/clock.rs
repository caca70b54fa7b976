//! Wall clock sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use duckhunt_core::Timestamp;

/// Source of the `now` passed into every engine operation.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Epoch milliseconds from the system clock.
///
/// Epoch time keeps persisted effect expiries meaningful across restarts.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = Utc::now().timestamp_millis();
        Timestamp::from_millis(u64::try_from(millis).unwrap_or(0))
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(step, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
