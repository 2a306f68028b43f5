//! Shop-local wall clock.
//!
//! The `past` slot classification and the queue `next_available` time are
//! the only time-relative rules in the core. They read the time through the
//! [`Clock`] trait so tests can pin it with a [`FixedClock`].

use std::fmt::Debug;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

/// Source of the current shop-local date and time.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current wall-clock time in the shop's timezone.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock backed by the system time, shifted to the shop's UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Creates a clock for a shop located at `offset` from UTC.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a clock from an offset in minutes, falling back to UTC when the
    /// offset is out of range.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    /// Creates a clock that always reports `now`.
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
