//! Repeating timer handles owned by the schedule engine.
//!
//! A handle is plain data: its key, its period, and the next instant it is
//! due. The engine keeps handles in its own tables, so dropping a handle from
//! the table is the whole of cancellation. A fire can only be delivered for a
//! handle that is still in the table when the engine looks for due work.

use crate::libs::breaks::BreakCategory;
use chrono::{Duration, NaiveDateTime};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Tolerance is this fraction of the interval (1/10).
const TOLERANCE_DIVISOR: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    Category(BreakCategory),
    Custom(Uuid),
}

impl Display for TimerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TimerKey::Category(category) => write!(f, "{}", category),
            TimerKey::Custom(id) => write!(f, "custom:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerHandle {
    key: TimerKey,
    interval: Duration,
    tolerance: Duration,
    next_fire: NaiveDateTime,
}

impl TimerHandle {
    /// Creates a handle whose first fire is one interval after `now`.
    pub fn schedule(key: TimerKey, interval_secs: u64, now: NaiveDateTime) -> Self {
        let interval = Duration::seconds(interval_secs.max(1) as i64);
        Self {
            key,
            interval,
            tolerance: interval / TOLERANCE_DIVISOR,
            next_fire: now + interval,
        }
    }

    pub fn key(&self) -> TimerKey {
        self.key
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn next_fire(&self) -> NaiveDateTime {
        self.next_fire
    }

    /// Latest instant the fire may be delivered when wakeups are coalesced.
    pub fn latest_fire(&self) -> NaiveDateTime {
        self.next_fire + self.tolerance
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_fire <= now
    }

    /// Moves the next fire past `now` in whole intervals.
    ///
    /// A late wakeup yields a single fire; missed periods are not replayed.
    pub fn advance(&mut self, now: NaiveDateTime) {
        while self.next_fire <= now {
            self.next_fire += self.interval;
        }
    }
}
