#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lumin::libs::breaks::{BreakTag, CustomBreak};
use lumin::libs::clock::{Clock, ManualClock};
use lumin::libs::config::Config;
use lumin::libs::engine::{EngineEvent, EngineReceiver, ScheduleEngine};
use lumin::libs::overlay::{OverlayHandle, OverlayPresenter, OverlayRequest, SessionId, SkipTrigger};
use lumin::libs::settings::SettingsStore;
use lumin::libs::statistics::StatisticsRecorder;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Simulated t = 0.
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap()
}

/// Simulated instant `secs` seconds after t = 0.
pub fn at(secs: i64) -> NaiveDateTime {
    base_time() + Duration::seconds(secs)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Scheduled(BreakTag, NaiveDateTime),
    Taken(BreakTag, NaiveDateTime, NaiveDateTime, u64),
    Skipped(BreakTag, NaiveDateTime, NaiveDateTime),
}

#[derive(Clone, Default)]
pub struct RecordingStatistics {
    pub events: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingStatistics {
    pub fn all(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn taken(&self) -> Vec<Recorded> {
        self.all().into_iter().filter(|e| matches!(e, Recorded::Taken(..))).collect()
    }

    pub fn skipped(&self) -> Vec<Recorded> {
        self.all().into_iter().filter(|e| matches!(e, Recorded::Skipped(..))).collect()
    }

    pub fn scheduled(&self) -> Vec<Recorded> {
        self.all().into_iter().filter(|e| matches!(e, Recorded::Scheduled(..))).collect()
    }
}

impl StatisticsRecorder for RecordingStatistics {
    fn record_scheduled(&self, tag: &BreakTag, at: NaiveDateTime) {
        self.events.lock().unwrap().push(Recorded::Scheduled(tag.clone(), at));
    }

    fn record_taken(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, actual_at: NaiveDateTime, duration: u64) {
        self.events
            .lock()
            .unwrap()
            .push(Recorded::Taken(tag.clone(), scheduled_at, actual_at, duration));
    }

    fn record_skipped(&self, tag: &BreakTag, scheduled_at: NaiveDateTime, skipped_at: NaiveDateTime) {
        self.events
            .lock()
            .unwrap()
            .push(Recorded::Skipped(tag.clone(), scheduled_at, skipped_at));
    }
}

/// Presenter that keeps every request and skip trigger, and logs every dismiss call.
#[derive(Clone, Default)]
pub struct RecordingOverlay {
    pub requests: Arc<Mutex<Vec<OverlayRequest>>>,
    pub triggers: Arc<Mutex<Vec<SkipTrigger>>>,
    pub dismissed: Arc<Mutex<Vec<SessionId>>>,
}

impl RecordingOverlay {
    pub fn requests(&self) -> Vec<OverlayRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dismissed(&self) -> Vec<SessionId> {
        self.dismissed.lock().unwrap().clone()
    }

    /// Skip trigger handed over with the most recent break.
    pub fn take_trigger(&self) -> SkipTrigger {
        self.triggers.lock().unwrap().pop().expect("no break was presented")
    }
}

struct RecordingHandle {
    session: SessionId,
    dismissed: Arc<Mutex<Vec<SessionId>>>,
}

impl OverlayHandle for RecordingHandle {
    fn dismiss(&mut self) {
        self.dismissed.lock().unwrap().push(self.session);
    }
}

impl OverlayPresenter for RecordingOverlay {
    fn present(&mut self, request: &OverlayRequest, on_skip: SkipTrigger) -> Box<dyn OverlayHandle> {
        self.requests.lock().unwrap().push(request.clone());
        self.triggers.lock().unwrap().push(on_skip);
        Box::new(RecordingHandle {
            session: request.session,
            dismissed: Arc::clone(&self.dismissed),
        })
    }
}

/// Regular breaks only: 1200 s interval, 20 s duration.
pub fn regular_only() -> Config {
    let mut config = Config::default();
    config.micro.enabled = false;
    config.water.enabled = false;
    config
}

/// An engine on a manual clock with recording collaborators.
pub struct Harness {
    pub engine: ScheduleEngine,
    pub clock: Arc<ManualClock>,
    pub statistics: RecordingStatistics,
    pub overlay: RecordingOverlay,
    pub events: Arc<Mutex<Vec<EngineEvent>>>,
    receiver: EngineReceiver,
}

impl Harness {
    pub fn new(config: Config, custom_breaks: Vec<CustomBreak>) -> Self {
        Self::with_settings(SettingsStore::in_memory(config, custom_breaks))
    }

    pub fn with_settings(settings: SettingsStore) -> Self {
        let clock = Arc::new(ManualClock::new(base_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let statistics = RecordingStatistics::default();
        let overlay = RecordingOverlay::default();
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut engine = ScheduleEngine::new(settings, Box::new(statistics.clone()), Box::new(overlay.clone()), dyn_clock, sender);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        Self {
            engine,
            clock,
            statistics,
            overlay,
            events,
            receiver,
        }
    }

    /// Same as `new`, with every timer started at t = 0.
    pub fn started(config: Config, custom_breaks: Vec<CustomBreak>) -> Self {
        let mut harness = Self::new(config, custom_breaks);
        harness.engine.start_all_timers();
        harness
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Delivers every deadline up to `target` in order, then leaves the clock at `target`.
    pub fn advance_to(&mut self, target: NaiveDateTime) {
        while let Some(deadline) = self.engine.next_deadline().filter(|deadline| *deadline <= target) {
            self.clock.set(deadline.max(self.clock.now()));
            self.engine.tick();
            self.drain();
        }
        self.clock.set(target);
        self.engine.tick();
        self.drain();
    }

    /// Runs every queued command, as the scheduler loop would.
    pub fn drain(&mut self) {
        while let Ok(command) = self.receiver.try_recv() {
            self.engine.handle(command);
        }
    }

    /// The user presses skip on the break currently shown.
    pub fn skip_current(&mut self) {
        self.overlay.take_trigger().fire();
        self.drain();
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}
