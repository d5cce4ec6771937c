//! Break statistics: the recorder the engine reports to, and the aggregates
//! the CLI reads back.
//!
//! The engine only ever sees [`StatisticsRecorder`]. Recording is
//! fire-and-forget: [`SqliteRecorder`] hands each event to a writer thread
//! that owns the database connection, so a slow disk never stalls the
//! scheduling loop and a failed insert is only logged. The daemon's recorder
//! stores local wall time (see [`SqliteRecorder::storing_local_time`]) while
//! the engine itself schedules on UTC.
//!
//! ## Aggregates
//!
//! [`DailyStatistics`] groups the events of one day (by scheduled time):
//! totals, completed counts per category and per custom name, time spent on
//! completed breaks, and the completion rate in percent.

use crate::db::break_events::BreakEvents;
use crate::db::db::Db;
use crate::libs::breaks::BreakTag;
use crate::libs::clock::to_local;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread::JoinHandle;

pub trait StatisticsRecorder: Send {
    /// Called when a timer-originated trigger starts a break.
    fn record_scheduled(&self, tag: &BreakTag, at: NaiveDateTime);

    fn record_taken(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, actual_at: NaiveDateTime, duration: u64);

    fn record_skipped(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, skipped_at: NaiveDateTime);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEvent {
    pub id: Option<i64>,
    pub tag: BreakTag,
    pub scheduled_at: NaiveDateTime,
    pub actual_at: NaiveDateTime,
    /// Seconds; 0 for skipped breaks.
    pub duration: u64,
    pub completed: bool,
}

impl BreakEvent {
    pub fn taken(tag: BreakTag, scheduled_at: NaiveDateTime, actual_at: NaiveDateTime, duration: u64) -> Self {
        Self {
            id: None,
            tag,
            scheduled_at,
            actual_at,
            duration,
            completed: true,
        }
    }

    pub fn skipped(tag: BreakTag, scheduled_at: NaiveDateTime, skipped_at: NaiveDateTime) -> Self {
        Self {
            id: None,
            tag,
            scheduled_at,
            actual_at: skipped_at,
            duration: 0,
            completed: false,
        }
    }

    /// Day the event counts towards.
    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStatistics {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub regular: usize,
    pub micro: usize,
    pub water: usize,
    pub custom: BTreeMap<String, usize>,
    /// Seconds spent on completed breaks.
    pub total_time: u64,
}

impl DailyStatistics {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            completed: 0,
            regular: 0,
            micro: 0,
            water: 0,
            custom: BTreeMap::new(),
            total_time: 0,
        }
    }

    /// Aggregates the events of `date`; events of other days are ignored.
    pub fn from_events(date: NaiveDate, events: &[BreakEvent]) -> Self {
        let mut stats = Self::empty(date);
        for event in events.iter().filter(|event| event.date() == date) {
            stats.total += 1;
            if !event.completed {
                continue;
            }
            stats.completed += 1;
            stats.total_time += event.duration;
            match &event.tag {
                BreakTag::Regular => stats.regular += 1,
                BreakTag::Micro => stats.micro += 1,
                BreakTag::Water => stats.water += 1,
                BreakTag::Custom(name) => *stats.custom.entry(name.clone()).or_default() += 1,
            }
        }
        stats
    }

    pub fn skipped(&self) -> usize {
        self.total - self.completed
    }

    /// Completed share of all breaks in percent, 0 when there were none.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Recorder backed by the SQLite statistics database.
///
/// `record_scheduled` is deliberately not stored: repeating timers would
/// otherwise grow the table without bound. Dropping the recorder flushes the
/// queue and joins the writer thread.
pub struct SqliteRecorder {
    sender: Option<mpsc::Sender<BreakEvent>>,
    writer: Option<JoinHandle<()>>,
    local_time: bool,
}

impl SqliteRecorder {
    /// Recorder on the default database, converting UTC instants to local time.
    pub fn new() -> Result<Self> {
        Ok(Self::with_db(Db::new()?).storing_local_time())
    }

    /// Stores times converted with [`to_local`] instead of as received.
    pub fn storing_local_time(mut self) -> Self {
        self.local_time = true;
        self
    }

    fn stamp(&self, at: NaiveDateTime) -> NaiveDateTime {
        if self.local_time {
            to_local(at)
        } else {
            at
        }
    }

    pub fn with_db(db: Db) -> Self {
        let (sender, receiver) = mpsc::channel::<BreakEvent>();
        let events = BreakEvents::from_db(db);

        let writer = std::thread::spawn(move || {
            for event in receiver {
                if let Err(e) = events.insert(&event) {
                    msg_warning!(Message::StatisticsWriteFailed(e.to_string()));
                }
            }
        });

        Self {
            sender: Some(sender),
            writer: Some(writer),
            local_time: false,
        }
    }

    fn send(&self, event: BreakEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                msg_warning!(Message::StatisticsWriteFailed("writer stopped".to_string()));
            }
        }
    }
}

impl StatisticsRecorder for SqliteRecorder {
    fn record_scheduled(&self, tag: &BreakTag, at: NaiveDateTime) {
        msg_debug!(format!("{} break scheduled at {}", tag, at));
    }

    fn record_taken(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, actual_at: NaiveDateTime, duration: u64) {
        self.send(BreakEvent::taken(tag.clone(), self.stamp(scheduled_at), self.stamp(actual_at), duration));
    }

    fn record_skipped(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, skipped_at: NaiveDateTime) {
        self.send(BreakEvent::skipped(tag.clone(), self.stamp(scheduled_at), self.stamp(skipped_at)));
    }
}

impl Drop for SqliteRecorder {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop once the queue is drained
        self.sender.take();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}
