//! The event loop that drives a [`ScheduleEngine`].
//!
//! One tokio task owns the engine and serializes everything that touches it:
//! timer deadlines, queued commands (skips from overlays), requests the CLI
//! leaves in the data directory and settings edits picked up from disk. The loop sleeps until the engine's
//! next coalesced wakeup and never blocks on anything else.

use crate::libs::breaks::CustomBreak;
use crate::libs::clock::Clock;
use crate::libs::config::{try_read_custom_breaks_from, Config, CONFIG_FILE_NAME, CUSTOM_BREAKS_FILE_NAME};
use crate::libs::control::{take_requests, ControlRequest};
use crate::libs::data_storage::DataStorage;
use crate::libs::engine::{EngineReceiver, ScheduleEngine};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info, msg_warning};
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Sleep used when no timer is running and no break is shown.
const IDLE_WAKE: Duration = Duration::from_secs(60);

/// Settings read back after an edit on disk.
///
/// `custom_breaks` is `None` when the custom breaks file exists but does not
/// decode; the definitions in memory then stay as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadedSettings {
    pub config: Config,
    pub custom_breaks: Option<Vec<CustomBreak>>,
}

/// Watches the data directory for input from other processes (the CLI):
/// edits to the settings files and queued [`ControlRequest`]s.
///
/// Settings changes are detected by comparing modification times on each
/// poll; both files are reloaded when either changed.
pub struct SettingsWatcher {
    storage: DataStorage,
    stamps: (Option<SystemTime>, Option<SystemTime>),
}

impl SettingsWatcher {
    /// Starts watching. Requests left over from an earlier run are discarded.
    pub fn new(storage: DataStorage) -> Self {
        if let Ok(stale) = take_requests(&storage) {
            if !stale.is_empty() {
                msg_debug!(format!("discarded {} stale request(s)", stale.len()));
            }
        }
        let stamps = Self::read_stamps(&storage);
        Self { storage, stamps }
    }

    fn read_stamps(storage: &DataStorage) -> (Option<SystemTime>, Option<SystemTime>) {
        let stamp = |file: &str| {
            storage
                .get_path(file)
                .ok()
                .and_then(|path| std::fs::metadata(path).ok())
                .and_then(|meta| meta.modified().ok())
        };
        (stamp(CONFIG_FILE_NAME), stamp(CUSTOM_BREAKS_FILE_NAME))
    }

    /// Returns the freshly read settings when a file changed since the last poll.
    pub fn poll(&mut self) -> Option<ReloadedSettings> {
        let stamps = Self::read_stamps(&self.storage);
        if stamps == self.stamps {
            return None;
        }
        self.stamps = stamps;

        let config = match Config::read_from(&self.storage) {
            Ok(config) => config,
            Err(e) => {
                msg_warning!(Message::ConfigLoadFailed(e.to_string()));
                return None;
            }
        };
        let custom_breaks = match try_read_custom_breaks_from(&self.storage) {
            Ok(custom_breaks) => Some(custom_breaks),
            Err(e) => {
                msg_warning!(Message::CustomBreaksKept(e.to_string()));
                None
            }
        };
        Some(ReloadedSettings { config, custom_breaks })
    }

    /// Requests queued by the CLI since the last call.
    pub fn take_requests(&self) -> Vec<ControlRequest> {
        take_requests(&self.storage).unwrap_or_else(|e| {
            msg_warning!(Message::ControlRequestsFailed(e.to_string()));
            Vec::new()
        })
    }
}

pub struct Scheduler {
    engine: ScheduleEngine,
    commands: EngineReceiver,
    clock: Arc<dyn Clock>,
    watcher: Option<SettingsWatcher>,
}

impl Scheduler {
    pub fn new(engine: ScheduleEngine, commands: EngineReceiver, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            commands,
            clock,
            watcher: None,
        }
    }

    pub fn with_watcher(mut self, watcher: SettingsWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn engine(&self) -> &ScheduleEngine {
        &self.engine
    }

    fn sleep_duration(&self) -> Duration {
        match self.engine.next_wake() {
            Some(at) => (at - self.clock.now()).to_std().unwrap_or(Duration::ZERO),
            None => IDLE_WAKE,
        }
    }

    /// Runs until `shutdown` resolves (or its sender is dropped), then stops every timer.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> Result<ScheduleEngine> {
        self.engine.start_all_timers();

        let poll_every = Duration::from_millis(self.engine.settings().config().settings_poll_interval.max(100));
        let mut settings_poll = tokio::time::interval(poll_every);
        settings_poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let sleep_for = self.sleep_duration();
            msg_debug!(format!("next wake in {:?}", sleep_for));

            tokio::select! {
                _ = &mut shutdown => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.engine.handle(command),
                    None => break,
                },
                _ = tokio::time::sleep(sleep_for) => {
                    self.engine.tick();
                }
                _ = settings_poll.tick(), if self.watcher.is_some() => self.poll_watcher(),
            }
        }

        self.engine.stop_all_timers();
        Ok(self.engine)
    }

    fn poll_watcher(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };

        if let Some(reloaded) = watcher.poll() {
            msg_debug!(Message::SettingsReloaded);
            // An unreadable custom list reconciles against itself, a no-op
            let custom_breaks = reloaded.custom_breaks.unwrap_or_else(|| self.engine.custom_breaks().to_vec());
            self.engine.apply_settings(reloaded.config, custom_breaks);
        }

        for request in watcher.take_requests() {
            msg_info!(Message::ControlRequestReceived(request.to_string()));
            self.engine.handle(request.into());
        }
    }
}
