//! Holds traits and their implementation for turning instants into calendar days.
//!
//! Calendar days are always evaluated at a fixed UTC offset (UTC+3:30 by default) instead of the
//! host's local zone, so every viewer sees the same "today" and the same day for a stored instant.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{GregorianDate, JalaliDate, Result};

/// Iran Standard Time, UTC+3:30, in minutes.
pub const IRAN_OFFSET_MINUTES: i32 = 210;

const SECONDS_PER_DAY: i64 = 86_400;

/// Read a calendar day out of an instant measured against the Unix epoch.
pub trait FromEpochDelta {
    /// Whole seconds since the epoch, negative before it (rounded toward the past).
    ///
    /// This must be saturating.
    fn epoch_secs(&self) -> i64;

    /// The Gregorian day containing this instant at a constant UTC offset.
    fn fixed_offset_date(&self, offset_minutes: i32) -> Result<GregorianDate> {
        let local = self
            .epoch_secs()
            .saturating_add(offset_minutes as i64 * 60);
        GregorianDate::from_days_since_epoch(local.div_euclid(SECONDS_PER_DAY))
    }

    /// The Jalali day containing this instant at a constant UTC offset.
    fn fixed_offset_jalali(&self, offset_minutes: i32) -> Result<JalaliDate> {
        self.fixed_offset_date(offset_minutes)?.to_jalali()
    }
}

impl FromEpochDelta for Duration {
    fn epoch_secs(&self) -> i64 {
        self.as_secs().min(i64::MAX as u64) as i64
    }
}

impl FromEpochDelta for SystemTime {
    fn epoch_secs(&self) -> i64 {
        match self.duration_since(UNIX_EPOCH) {
            Ok(d) => d.epoch_secs(),
            Err(e) => {
                let d = e.duration();
                let partial = i64::from(d.subsec_nanos() > 0);
                d.epoch_secs().saturating_add(partial).saturating_neg()
            }
        }
    }
}

impl GregorianDate {
    /// The instant this day starts at a constant UTC offset.
    ///
    /// Inverse of [`FromEpochDelta::fixed_offset_date`] for the same offset.
    pub fn midnight_at_offset(&self, offset_minutes: i32) -> SystemTime {
        let secs = self.days_since_epoch() * SECONDS_PER_DAY - offset_minutes as i64 * 60;
        if secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(secs as u64)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(secs.unsigned_abs()))
                .unwrap_or(UNIX_EPOCH)
        }
    }
}

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A settable clock shared between clones, for driving time-sensitive logic in tests.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<SystemTime>>);

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    pub fn new(at: SystemTime) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(at)))
    }

    pub fn set(&self, at: SystemTime) {
        self.0.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.0.get()
    }
}
