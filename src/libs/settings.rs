//! The configuration store used by the schedule engine.
//!
//! [`SettingsStore`] keeps the authoritative settings in memory and mirrors
//! every write to disk. Reads always see the last write, even when persisting
//! it failed: the failure is reported as a warning and the in-memory value
//! stays in effect for the rest of the session.
//!
//! The CLI writes synchronously. The daemon opens the store with
//! [`SettingsStore::open_background`], which hands each snapshot to a writer
//! thread so the scheduling task never waits on the disk.
//!
//! Schedules of the three scheduled categories are validated before anything
//! is written. An out-of-range value is rejected with a [`SettingsError`] and
//! the previous values are kept; they are never clamped.

use super::breaks::{BreakCategory, CustomBreak};
use super::config::{read_custom_breaks_from, write_custom_breaks_to, CategorySchedule, Config};
use super::data_storage::DataStorage;
use super::messages::Message;
use crate::msg_warning;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_INTERVAL: u64 = 60;
pub const MAX_INTERVAL: u64 = 43_200;
pub const MAX_WATER_INTERVAL: u64 = 3_600;
pub const MIN_DURATION: u64 = 1;
pub const MAX_DURATION: u64 = 3_600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{category} break interval must be between {min} and {max} seconds (got {value})")]
    IntervalOutOfRange { category: BreakCategory, value: u64, min: u64, max: u64 },
    #[error("{category} break duration must be between {min} and {max} seconds (got {value})")]
    DurationOutOfRange { category: BreakCategory, value: u64, min: u64, max: u64 },
    #[error("{0} breaks have no schedule of their own")]
    NotSchedulable(BreakCategory),
}

/// Allowed interval range of a scheduled category.
pub fn interval_bounds(category: BreakCategory) -> Result<(u64, u64), SettingsError> {
    match category {
        BreakCategory::Regular | BreakCategory::Micro => Ok((MIN_INTERVAL, MAX_INTERVAL)),
        BreakCategory::Water => Ok((MIN_INTERVAL, MAX_WATER_INTERVAL)),
        BreakCategory::Custom => Err(SettingsError::NotSchedulable(category)),
    }
}

pub fn validate_interval(category: BreakCategory, value: u64) -> Result<(), SettingsError> {
    let (min, max) = interval_bounds(category)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::IntervalOutOfRange { category, value, min, max })
    }
}

pub fn validate_duration(category: BreakCategory, value: u64) -> Result<(), SettingsError> {
    if !category.is_schedulable() {
        return Err(SettingsError::NotSchedulable(category));
    }
    if (MIN_DURATION..=MAX_DURATION).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::DurationOutOfRange {
            category,
            value,
            min: MIN_DURATION,
            max: MAX_DURATION,
        })
    }
}

#[derive(Debug)]
enum PersistJob {
    Config(Config),
    CustomBreaks(Vec<CustomBreak>),
}

/// Writer thread owning the settings files. Dropping it flushes the queue
/// and joins the thread.
#[derive(Debug)]
struct SettingsWriter {
    sender: Option<mpsc::Sender<PersistJob>>,
    writer: Option<JoinHandle<()>>,
}

impl SettingsWriter {
    fn start(storage: DataStorage) -> Self {
        let (sender, receiver) = mpsc::channel::<PersistJob>();

        let writer = std::thread::spawn(move || {
            for job in receiver {
                let result = match &job {
                    PersistJob::Config(config) => config.save_to(&storage),
                    PersistJob::CustomBreaks(custom_breaks) => write_custom_breaks_to(&storage, custom_breaks),
                };
                if let Err(e) = result {
                    msg_warning!(Message::SettingsPersistFailed(e.to_string()));
                }
            }
        });

        Self {
            sender: Some(sender),
            writer: Some(writer),
        }
    }

    fn send(&self, job: PersistJob) {
        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                msg_warning!(Message::SettingsPersistFailed("writer stopped".to_string()));
            }
        }
    }
}

impl Drop for SettingsWriter {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}

#[derive(Debug, Clone)]
enum Backing {
    Disk(DataStorage),
    Background { storage: DataStorage, writer: Arc<SettingsWriter> },
    Memory,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    config: Config,
    custom_breaks: Vec<CustomBreak>,
    backing: Backing,
}

impl SettingsStore {
    /// Opens the store in the default data directory.
    pub fn load() -> Self {
        Self::open(DataStorage::new())
    }

    /// Opens the store backed by the files in `storage`.
    ///
    /// An unreadable `config.json` falls back to defaults with a warning.
    pub fn open(storage: DataStorage) -> Self {
        let config = Config::read_from(&storage).unwrap_or_else(|e| {
            msg_warning!(Message::ConfigLoadFailed(e.to_string()));
            Config::default()
        });
        let custom_breaks = read_custom_breaks_from(&storage);

        Self {
            config,
            custom_breaks,
            backing: Backing::Disk(storage),
        }
    }

    /// Like [`open`](Self::open), but writes go through a background thread.
    ///
    /// Writes land in order. The last clone of the store to be dropped waits
    /// for pending writes.
    pub fn open_background(storage: DataStorage) -> Self {
        let mut store = Self::open(storage.clone());
        let writer = Arc::new(SettingsWriter::start(storage.clone()));
        store.backing = Backing::Background { storage, writer };
        store
    }

    /// A store that never touches the disk.
    pub fn in_memory(config: Config, custom_breaks: Vec<CustomBreak>) -> Self {
        Self {
            config,
            custom_breaks,
            backing: Backing::Memory,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> Option<&DataStorage> {
        match &self.backing {
            Backing::Disk(storage) | Backing::Background { storage, .. } => Some(storage),
            Backing::Memory => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn schedule(&self, category: BreakCategory) -> Option<CategorySchedule> {
        self.config.schedule(category).copied()
    }

    pub fn custom_breaks(&self) -> &[CustomBreak] {
        &self.custom_breaks
    }

    pub fn custom_break(&self, id: Uuid) -> Option<&CustomBreak> {
        self.custom_breaks.iter().find(|definition| definition.id == id)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.persist_config();
    }

    pub fn set_category_enabled(&mut self, category: BreakCategory, enabled: bool) -> Result<(), SettingsError> {
        let schedule = self.config.schedule_mut(category).ok_or(SettingsError::NotSchedulable(category))?;
        schedule.enabled = enabled;
        self.persist_config();
        Ok(())
    }

    /// Validates both values, then writes both. On error nothing changes.
    pub fn set_schedule(&mut self, category: BreakCategory, interval: u64, duration: u64) -> Result<(), SettingsError> {
        validate_interval(category, interval)?;
        validate_duration(category, duration)?;

        let schedule = self.config.schedule_mut(category).ok_or(SettingsError::NotSchedulable(category))?;
        schedule.interval = interval;
        schedule.duration = duration;
        self.persist_config();
        Ok(())
    }

    pub fn set_custom_breaks_enabled(&mut self, enabled: bool) {
        self.config.custom_breaks_enabled = enabled;
        self.persist_config();
    }

    pub fn set_start_at_login(&mut self, enabled: bool) {
        self.config.start_at_login = enabled;
        self.persist_config();
    }

    pub fn set_settings_poll_interval(&mut self, millis: u64) {
        self.config.settings_poll_interval = millis;
        self.persist_config();
    }

    /// Replaces the custom break list. Callers normalize entries first.
    pub fn set_custom_breaks(&mut self, custom_breaks: Vec<CustomBreak>) {
        self.custom_breaks = custom_breaks;
        match &self.backing {
            Backing::Disk(storage) => {
                if let Err(e) = write_custom_breaks_to(storage, &self.custom_breaks) {
                    msg_warning!(Message::SettingsPersistFailed(e.to_string()));
                }
            }
            Backing::Background { writer, .. } => writer.send(PersistJob::CustomBreaks(self.custom_breaks.clone())),
            Backing::Memory => {}
        }
    }

    fn persist_config(&self) {
        match &self.backing {
            Backing::Disk(storage) => {
                if let Err(e) = self.config.save_to(storage) {
                    msg_warning!(Message::SettingsPersistFailed(e.to_string()));
                }
            }
            Backing::Background { writer, .. } => writer.send(PersistJob::Config(self.config.clone())),
            Backing::Memory => {}
        }
    }
}
