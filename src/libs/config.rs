//! Persistent schedule configuration.
//!
//! Two files in the data directory back the settings:
//!
//! - **`config.json`**: master toggle, the three category schedules, the custom
//!   break gate, the login flag and the daemon's settings poll period
//! - **`custom_breaks.json`**: the ordered custom break list, stored as one
//!   opaque JSON array
//!
//! Missing fields take their defaults, so an older or hand-trimmed
//! `config.json` still loads. A custom break list that cannot be decoded
//! reads as empty through [`read_custom_breaks_from`]; anything that writes
//! the list back checks [`try_read_custom_breaks_from`] first.
//!
//! Both files are replaced atomically: the new content goes to a sibling
//! `.tmp` file that is then renamed over the old one, so a concurrent reader
//! sees either the old or the new file, never a partial one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lumin::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.water.interval = 2_400;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::breaks::{normalize_custom_break, BreakCategory, CustomBreak};
use super::data_storage::DataStorage;
use super::messages::Message;
use super::settings::{validate_duration, validate_interval};
use crate::{msg_print, msg_warning};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CUSTOM_BREAKS_FILE_NAME: &str = "custom_breaks.json";

/// Interval, duration (both seconds) and toggle of one scheduled category.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorySchedule {
    pub interval: u64,
    pub duration: u64,
    pub enabled: bool,
}

impl CategorySchedule {
    pub const fn new(interval: u64, duration: u64) -> Self {
        Self { interval, duration, enabled: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Master toggle; supersedes every category flag.
    pub enabled: bool,
    pub regular: CategorySchedule,
    pub micro: CategorySchedule,
    pub water: CategorySchedule,
    pub custom_breaks_enabled: bool,
    pub start_at_login: bool,
    /// How often the daemon checks the settings files for outside edits, in milliseconds.
    pub settings_poll_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            regular: CategorySchedule::new(1_200, 20),
            micro: CategorySchedule::new(300, 2),
            water: CategorySchedule::new(1_800, 5),
            custom_breaks_enabled: true,
            start_at_login: false,
            settings_poll_interval: 2_000,
        }
    }
}

impl Config {
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    /// Reads `config.json` from `storage`; a missing file yields the defaults.
    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        write_replacing(&config_file_path, &serde_json::to_vec_pretty(self)?)
    }

    /// Schedule of a scheduled category, `None` for `Custom`.
    pub fn schedule(&self, category: BreakCategory) -> Option<&CategorySchedule> {
        match category {
            BreakCategory::Regular => Some(&self.regular),
            BreakCategory::Micro => Some(&self.micro),
            BreakCategory::Water => Some(&self.water),
            BreakCategory::Custom => None,
        }
    }

    pub fn schedule_mut(&mut self, category: BreakCategory) -> Option<&mut CategorySchedule> {
        match category {
            BreakCategory::Regular => Some(&mut self.regular),
            BreakCategory::Micro => Some(&mut self.micro),
            BreakCategory::Water => Some(&mut self.water),
            BreakCategory::Custom => None,
        }
    }

    /// Interactive setup of the master toggle and the three schedules.
    ///
    /// Out-of-range answers are rejected inline and the prompt repeats, so the
    /// returned configuration always passes validation.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        config.enabled = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptBreaksEnabled.to_string())
            .default(config.enabled)
            .interact()?;

        for category in BreakCategory::SCHEDULED {
            let Some(current) = config.schedule(category).copied() else {
                continue;
            };
            msg_print!(Message::ConfigSection(category));

            let enabled = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptCategoryEnabled(category).to_string())
                .default(current.enabled)
                .interact()?;

            let interval: u64 = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptInterval(category).to_string())
                .default(current.interval)
                .validate_with(|value: &u64| validate_interval(category, *value).map_err(|e| e.to_string()))
                .interact_text()?;

            let duration: u64 = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptDuration(category).to_string())
                .default(current.duration)
                .validate_with(|value: &u64| validate_duration(category, *value).map_err(|e| e.to_string()))
                .interact_text()?;

            if let Some(schedule) = config.schedule_mut(category) {
                *schedule = CategorySchedule { interval, duration, enabled };
            }
        }

        config.custom_breaks_enabled = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptCustomBreaksEnabled.to_string())
            .default(config.custom_breaks_enabled)
            .interact()?;

        Ok(config)
    }
}

/// Loads the custom break list.
///
/// Never fails: an unreadable or undecodable blob is reported as a warning and
/// yields an empty list. Entries are normalized on the way in.
pub fn read_custom_breaks_from(storage: &DataStorage) -> Vec<CustomBreak> {
    try_read_custom_breaks_from(storage).unwrap_or_else(|e| {
        msg_warning!(Message::CustomBreaksLoadFailed(e.to_string()));
        Vec::new()
    })
}

/// Loads the custom break list, failing when the blob cannot be read or decoded.
///
/// A missing file is an empty list. Callers that write the list back must use
/// this instead of [`read_custom_breaks_from`], so a damaged file is never
/// mistaken for an empty one and overwritten.
pub fn try_read_custom_breaks_from(storage: &DataStorage) -> Result<Vec<CustomBreak>> {
    let path = storage.get_path(CUSTOM_BREAKS_FILE_NAME)?;
    if !path.exists() {
        return Ok(Vec::new());
    }

    let blob = fs::read_to_string(&path)?;
    let definitions: Vec<CustomBreak> = serde_json::from_str(&blob)?;
    Ok(definitions.into_iter().map(|definition| normalize_custom_break(definition).0).collect())
}

pub fn write_custom_breaks_to(storage: &DataStorage, definitions: &[CustomBreak]) -> Result<()> {
    let path = storage.get_path(CUSTOM_BREAKS_FILE_NAME)?;
    write_replacing(&path, &serde_json::to_vec_pretty(definitions)?)
}

/// Writes `contents` next to `path` and renames it into place.
fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, contents)?;
    if let Err(e) = fs::rename(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(e.into());
    }
    Ok(())
}
