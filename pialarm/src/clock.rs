//! Clock source collaborator.
//!
//! The core never reads the OS clock directly; it asks a [`ClockSource`]
//! so tests can drive time explicitly.

use parking_lot::Mutex;
use time::{OffsetDateTime, UtcOffset};

use crate::tracing::prelude::*;

pub trait ClockSource: Send + Sync {
    /// Current wall-clock time with the local timezone offset applied.
    fn now(&self) -> OffsetDateTime;
}

/// OS clock with a fixed UTC offset.
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Use the system's local offset, falling back to UTC when it cannot
    /// be determined (e.g. multi-threaded environments on some platforms).
    pub fn local() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
            warn!("Local UTC offset indeterminate, falling back to UTC");
            UtcOffset::UTC
        });
        Self { offset }
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Manually driven clock for tests and simulation.
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock() = now;
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock()
    }
}
