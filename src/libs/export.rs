//! Export of recorded break events.
//!
//! Writes the break events of a date range to a file, one record per event:
//!
//! - **CSV**: header row plus one row per event (`csv`)
//! - **JSON**: a pretty-printed array of records (`serde_json`)
//!
//! Without an explicit output path the file is named
//! `lumin_export_<YYYYmmdd_HHMMSS>.<ext>` in the current directory.

use crate::db::break_events::BreakEvents;
use crate::libs::messages::Message;
use crate::libs::statistics::BreakEvent;
use crate::msg_success;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Flat, string-typed form of a [`BreakEvent`] as it appears in exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub date: String,
    pub category: String,
    pub name: String,
    pub scheduled_at: String,
    pub actual_at: String,
    pub duration: u64,
    pub completed: bool,
}

impl From<&BreakEvent> for ExportRecord {
    fn from(event: &BreakEvent) -> Self {
        Self {
            date: event.date().format("%Y-%m-%d").to_string(),
            category: event.tag.category().as_str().to_string(),
            name: event.tag.custom_name().unwrap_or_default().to_string(),
            scheduled_at: event.scheduled_at.format(TIMESTAMP_FORMAT).to_string(),
            actual_at: event.actual_at.format(TIMESTAMP_FORMAT).to_string(),
            duration: event.duration,
            completed: event.completed,
        }
    }
}

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let output_path = output_path.unwrap_or_else(|| {
            PathBuf::from(format!(
                "lumin_export_{}.{}",
                Local::now().format("%Y%m%d_%H%M%S"),
                format.extension()
            ))
        });

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Exports the events scheduled between `from` and `to`, both inclusive.
    /// Returns the number of exported events.
    pub fn export_range(&self, events: &BreakEvents, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        let events = events.fetch_range(from, to)?;
        self.export_events(&events)?;
        msg_success!(Message::ExportCompleted(events.len(), self.output_path.display().to_string()));
        Ok(events.len())
    }

    pub fn export_events(&self, events: &[BreakEvent]) -> Result<()> {
        let records: Vec<ExportRecord> = events.iter().map(ExportRecord::from).collect();

        match self.format {
            ExportFormat::Csv => self.write_csv(&records),
            ExportFormat::Json => self.write_json(&records),
        }
    }

    fn write_csv(&self, records: &[ExportRecord]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        wtr.write_record(["Date", "Category", "Name", "Scheduled", "Actual", "Duration", "Completed"])?;

        for record in records {
            wtr.write_record([
                record.date.clone(),
                record.category.clone(),
                record.name.clone(),
                record.scheduled_at.clone(),
                record.actual_at.clone(),
                record.duration.to_string(),
                if record.completed { "yes".to_owned() } else { "no".to_owned() },
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_json(&self, records: &[ExportRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }
}
