//! Storage and queries for finished breaks.
//!
//! Each row is one taken or skipped break. Rows are dated by their scheduled
//! time, which is also how daily statistics group them.

use crate::db::db::Db;
use crate::libs::breaks::BreakTag;
use crate::libs::statistics::{BreakEvent, DailyStatistics};
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Row};

/// Window `most_active_day` looks back over.
pub const ACTIVE_DAY_WINDOW_DAYS: i64 = 30;

const SELECT_EVENTS: &str = "SELECT id, tag, custom_name, scheduled_at, actual_at, duration, completed FROM break_events";

pub struct BreakEvents {
    db: Db,
}

impl BreakEvents {
    pub fn new() -> Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn from_db(db: Db) -> Self {
        Self { db }
    }

    pub fn insert(&self, event: &BreakEvent) -> Result<i64> {
        let conn = &self.db.conn;
        conn.execute(
            "INSERT INTO break_events (date, tag, custom_name, scheduled_at, actual_at, duration, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.date(),
                event.tag.category().as_str(),
                event.tag.custom_name(),
                event.scheduled_at,
                event.actual_at,
                event.duration as i64,
                event.completed,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn fetch_all(&self) -> Result<Vec<BreakEvent>> {
        let mut stmt = self.db.conn.prepare(&format!("{} ORDER BY scheduled_at, id", SELECT_EVENTS))?;
        let rows = stmt.query_map([], map_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.extend(row?);
        }
        Ok(events)
    }

    /// Events dated between `from` and `to`, both inclusive.
    pub fn fetch_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<BreakEvent>> {
        let mut stmt = self
            .db
            .conn
            .prepare(&format!("{} WHERE date BETWEEN ?1 AND ?2 ORDER BY scheduled_at, id", SELECT_EVENTS))?;
        let rows = stmt.query_map(params![from, to], map_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.extend(row?);
        }
        Ok(events)
    }

    pub fn daily_statistics(&self, date: NaiveDate) -> Result<DailyStatistics> {
        let events = self.fetch_range(date, date)?;
        Ok(DailyStatistics::from_events(date, &events))
    }

    /// One entry per day for the `days` days ending at `ending`, oldest first.
    pub fn range_statistics(&self, ending: NaiveDate, days: u32) -> Result<Vec<DailyStatistics>> {
        let days = days.max(1) as i64;
        let start = ending - Duration::days(days - 1);
        let events = self.fetch_range(start, ending)?;

        Ok((0..days)
            .map(|offset| DailyStatistics::from_events(start + Duration::days(offset), &events))
            .collect())
    }

    pub fn weekly_statistics(&self, ending: NaiveDate) -> Result<Vec<DailyStatistics>> {
        self.range_statistics(ending, 7)
    }

    /// Number of completed breaks carrying `tag`, all time.
    pub fn total_completed(&self, tag: &BreakTag) -> Result<usize> {
        let count: i64 = self.db.conn.query_row(
            "SELECT COUNT(*) FROM break_events WHERE tag = ?1 AND custom_name IS ?2 AND completed = 1",
            params![tag.category().as_str(), tag.custom_name()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Completed share of all recorded breaks in percent, 0 when there are none.
    pub fn completion_rate(&self) -> Result<f64> {
        let (total, completed): (i64, i64) = self.db.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM break_events",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if total == 0 {
            Ok(0.0)
        } else {
            Ok(completed as f64 / total as f64 * 100.0)
        }
    }

    /// Day with the most completed breaks in the 30 days up to `today`.
    ///
    /// Days are taken from the moment the break actually ended. Ties go to the
    /// most recent day.
    pub fn most_active_day(&self, today: NaiveDate) -> Result<Option<(NaiveDate, usize)>> {
        let since = today - Duration::days(ACTIVE_DAY_WINDOW_DAYS);
        let mut stmt = self.db.conn.prepare(
            "SELECT date(actual_at) AS day, COUNT(*) AS taken
             FROM break_events
             WHERE completed = 1 AND date(actual_at) >= ?1
             GROUP BY day
             ORDER BY taken DESC, day DESC
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![since], |row| Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?)))?;

        match rows.next() {
            Some(row) => {
                let (day, count) = row?;
                Ok(Some((day, count as usize)))
            }
            None => Ok(None),
        }
    }

    /// Deletes every recorded event and returns how many were removed.
    pub fn reset(&self) -> Result<usize> {
        Ok(self.db.conn.execute("DELETE FROM break_events", [])?)
    }
}

/// Maps a row to an event; rows with an unknown tag are skipped.
fn map_event(row: &Row) -> rusqlite::Result<Option<BreakEvent>> {
    let tag: String = row.get(1)?;
    let custom_name: Option<String> = row.get(2)?;
    let Some(tag) = BreakTag::from_parts(&tag, custom_name) else {
        return Ok(None);
    };

    Ok(Some(BreakEvent {
        id: Some(row.get(0)?),
        tag,
        scheduled_at: row.get::<_, NaiveDateTime>(3)?,
        actual_at: row.get::<_, NaiveDateTime>(4)?,
        duration: row.get::<_, i64>(5)?.max(0) as u64,
        completed: row.get(6)?,
    }))
}
