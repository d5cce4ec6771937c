//! Time source for the scheduler.
//!
//! Production code reads UTC through [`SystemClock`], so daylight saving
//! changes never shift or repeat a timer. Local time only appears at the
//! edges: statistics rows and the schedule shown to the user go through
//! [`to_local`]. Simulations and tests drive a [`ManualClock`] so a whole
//! day of timer fires can be replayed instantly.

use chrono::{Duration, Local, NaiveDateTime, TimeZone, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Converts a UTC instant read from [`SystemClock`] to local wall time.
pub fn to_local(at: NaiveDateTime) -> NaiveDateTime {
    Utc.from_utc_datetime(&at).with_timezone(&Local).naive_local()
}

#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock() = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
