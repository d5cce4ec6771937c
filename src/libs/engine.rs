//! The break schedule engine.
//!
//! [`ScheduleEngine`] owns one repeating timer per enabled scheduled category
//! (regular, micro, water) and one per enabled custom break, and runs the life
//! cycle of a break:
//!
//! ```text
//! Idle ──fire──▶ Triggered ──present──▶ Presenting ──skip────▶ Skipped ───┐
//!                                            │                            ├──▶ Idle
//!                                            └──deadline──▶ Completed ───┘
//! ```
//!
//! ## Rules
//!
//! - **One break at a time**: a trigger that arrives while a break is
//!   presenting is dropped. It is not queued and nothing is recorded for it.
//! - **Selective restart**: a settings change touches only the timer it
//!   concerns; every other countdown keeps running.
//! - **Restart points**: regular and water timers restart when their break
//!   ends, the micro timer restarts when its break starts, a custom timer
//!   restarts by id when its break ends.
//! - **Single finish**: taking the active session out of the engine is the
//!   latch deciding between skip and completion; whichever comes second is
//!   ignored.
//! - **Gates**: no timer exists while the master toggle is off. Category
//!   timers also need their own flag, custom timers need the custom gate and
//!   their definition's flag.
//!
//! ## Driving the engine
//!
//! The engine never sleeps and never spawns. A runtime asks for
//! [`next_wake`](ScheduleEngine::next_wake), waits, then calls
//! [`tick`](ScheduleEngine::tick); commands queued by overlays or other
//! components arrive through [`handle`](ScheduleEngine::handle). All of this
//! happens on one task, which is what makes the state here lock-free.

use crate::libs::breaks::{normalize_custom_break, BreakCategory, BreakTag, CustomBreak};
use crate::libs::clock::Clock;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::overlay::{OverlayHandle, OverlayPresenter, OverlayRequest, SessionId, SkipTrigger};
use crate::libs::settings::{SettingsError, SettingsStore};
use crate::libs::statistics::StatisticsRecorder;
use crate::libs::timer::{TimerHandle, TimerKey};
use crate::{msg_debug, msg_info, msg_warning};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type EngineSender = mpsc::UnboundedSender<EngineCommand>;
pub type EngineReceiver = mpsc::UnboundedReceiver<EngineCommand>;

/// Work queued for the engine's task.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// The user skipped the break shown for this session.
    Skip(SessionId),
    StartBreakNow,
    SkipNextBreak,
    /// Skips whatever break is on screen, if any.
    SkipActiveBreak,
    SetEnabled(bool),
    ToggleEnabled,
    /// Settings edited outside the engine, to be reconciled field by field.
    ReloadSettings { config: Config, custom_breaks: Vec<CustomBreak> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    Taken,
    Skipped,
    /// Ended because all timers were stopped; nothing is recorded.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TimerScheduled { key: TimerKey, next_fire: NaiveDateTime },
    TimerCancelled { key: TimerKey },
    BreakStarted { session: SessionId, tag: BreakTag, duration: u64 },
    BreakEnded { session: SessionId, tag: BreakTag, outcome: BreakOutcome },
    TriggerDropped { tag: BreakTag },
    EnabledChanged(bool),
}

pub type EngineObserver = Box<dyn Fn(&EngineEvent) + Send>;

/// The break currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakSession {
    pub id: SessionId,
    pub tag: BreakTag,
    pub category: BreakCategory,
    pub custom_id: Option<Uuid>,
    pub title: String,
    pub icon: String,
    /// Captured at trigger time; later edits apply to the next break only.
    pub duration: u64,
    pub started_at: NaiveDateTime,
    /// `started_at + max(1, duration)` seconds.
    pub completes_at: NaiveDateTime,
}

struct ActiveBreak {
    session: BreakSession,
    overlay: Box<dyn OverlayHandle>,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Timer(TimerKey),
    Manual(BreakCategory),
}

#[derive(Debug, Clone, Copy)]
enum Due {
    Completion(SessionId),
    Fire(TimerKey),
}

struct BreakPlan {
    tag: BreakTag,
    category: BreakCategory,
    custom_id: Option<Uuid>,
    title: String,
    icon: String,
    duration: u64,
}

pub struct ScheduleEngine {
    settings: SettingsStore,
    statistics: Box<dyn StatisticsRecorder>,
    presenter: Box<dyn OverlayPresenter>,
    clock: Arc<dyn Clock>,
    sender: EngineSender,
    regular_timer: Option<TimerHandle>,
    micro_timer: Option<TimerHandle>,
    water_timer: Option<TimerHandle>,
    custom_timers: HashMap<Uuid, TimerHandle>,
    custom_index: HashMap<Uuid, CustomBreak>,
    active: Option<ActiveBreak>,
    next_session: SessionId,
    observers: Vec<EngineObserver>,
}

impl ScheduleEngine {
    /// Builds an idle engine. No timer runs until [`start_all_timers`](Self::start_all_timers).
    ///
    /// `sender` must feed the queue the engine's runtime drains into
    /// [`handle`](Self::handle); skip callbacks handed to overlays post to it.
    pub fn new(
        settings: SettingsStore,
        statistics: Box<dyn StatisticsRecorder>,
        presenter: Box<dyn OverlayPresenter>,
        clock: Arc<dyn Clock>,
        sender: EngineSender,
    ) -> Self {
        let mut engine = Self {
            settings,
            statistics,
            presenter,
            clock,
            sender,
            regular_timer: None,
            micro_timer: None,
            water_timer: None,
            custom_timers: HashMap::new(),
            custom_index: HashMap::new(),
            active: None,
            next_session: 1,
            observers: Vec::new(),
        };
        engine.reindex_custom_breaks();
        engine
    }

    /// Registers `observer` for every [`EngineEvent`], in emission order.
    pub fn subscribe(&mut self, observer: impl Fn(&EngineEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ---- timer orchestration ----------------------------------------------

    /// Starts every enabled timer that is not already running.
    ///
    /// Running timers keep their countdown. No-op while the master toggle is off.
    pub fn start_all_timers(&mut self) {
        if !self.settings.is_enabled() {
            msg_debug!(Message::BreaksDisabledNoTimers);
            return;
        }

        for category in BreakCategory::SCHEDULED {
            if self.timer(category).is_some() {
                continue;
            }
            if let Some(schedule) = self.settings.schedule(category).filter(|schedule| schedule.enabled) {
                self.install_timer(TimerKey::Category(category), schedule.interval);
            }
        }

        if self.settings.config().custom_breaks_enabled {
            self.start_custom_timers();
        }
    }

    /// Cancels every timer and ends a break in progress without recording it.
    pub fn stop_all_timers(&mut self) {
        for category in BreakCategory::SCHEDULED {
            self.cancel_timer(TimerKey::Category(category));
        }
        self.stop_custom_timers();

        if let Some(mut active) = self.active.take() {
            active.overlay.dismiss();
            msg_info!(Message::BreakCancelled(active.session.title.clone()));
            self.emit(EngineEvent::BreakEnded {
                session: active.session.id,
                tag: active.session.tag,
                outcome: BreakOutcome::Cancelled,
            });
        }
    }

    /// Replaces the timer of a scheduled category with a fresh one counting from now.
    ///
    /// Other timers are untouched. When the category is disabled (or the
    /// master toggle is off) the timer is only cancelled.
    pub fn restart_timer(&mut self, category: BreakCategory) {
        if !category.is_schedulable() {
            return;
        }
        self.cancel_timer(TimerKey::Category(category));

        if !self.category_gate(category) {
            return;
        }
        if let Some(schedule) = self.settings.schedule(category) {
            self.install_timer(TimerKey::Category(category), schedule.interval);
        }
    }

    pub fn restart_regular_timer(&mut self) {
        self.restart_timer(BreakCategory::Regular);
    }

    pub fn restart_micro_timer(&mut self) {
        self.restart_timer(BreakCategory::Micro);
    }

    pub fn restart_water_timer(&mut self) {
        self.restart_timer(BreakCategory::Water);
    }

    /// Same as [`restart_timer`](Self::restart_timer) for one custom break.
    pub fn restart_custom_timer(&mut self, id: Uuid) {
        self.cancel_timer(TimerKey::Custom(id));

        let Some(interval) = self
            .custom_index
            .get(&id)
            .filter(|definition| self.custom_gate(definition))
            .map(|definition| definition.interval)
        else {
            return;
        };
        self.install_timer(TimerKey::Custom(id), interval);
    }

    /// Cancels the timer of one custom break. Returns whether one was running.
    pub fn stop_custom_timer(&mut self, id: Uuid) -> bool {
        self.cancel_timer(TimerKey::Custom(id))
    }

    // ---- settings ---------------------------------------------------------

    /// The settings currently in effect.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Sets the master toggle, starting or stopping every timer. No-op when unchanged.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.is_enabled() == enabled {
            return;
        }
        self.settings.set_enabled(enabled);
        msg_info!(Message::BreaksToggled(enabled));
        self.emit(EngineEvent::EnabledChanged(enabled));

        if enabled {
            self.start_all_timers();
        } else {
            self.stop_all_timers();
        }
    }

    /// Flips the master toggle and returns the new state.
    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = !self.settings.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    /// Turning a category on restarts only its timer, turning it off cancels only its timer.
    pub fn set_category_enabled(&mut self, category: BreakCategory, enabled: bool) -> Result<(), SettingsError> {
        self.settings.set_category_enabled(category, enabled)?;
        if enabled {
            self.restart_timer(category);
        } else {
            self.cancel_timer(TimerKey::Category(category));
        }
        Ok(())
    }

    /// Gates all custom timers at once; definitions keep their own flags.
    pub fn set_custom_breaks_enabled(&mut self, enabled: bool) {
        self.settings.set_custom_breaks_enabled(enabled);
        if !enabled {
            self.stop_custom_timers();
        } else if self.settings.is_enabled() {
            self.start_custom_timers();
        }
    }

    /// Stored only. Registering with the OS is the `autostart` command's job.
    pub fn set_start_at_login(&mut self, enabled: bool) {
        self.settings.set_start_at_login(enabled);
    }

    /// Validates and stores a category's schedule, then restarts its timer when the category is live.
    ///
    /// Invalid values leave the stored schedule and the running timer as they were.
    pub fn update_break_settings(&mut self, category: BreakCategory, interval: u64, duration: u64) -> Result<(), SettingsError> {
        self.settings.set_schedule(category, interval, duration)?;
        if self.category_gate(category) {
            self.restart_timer(category);
        }
        Ok(())
    }

    pub fn update_regular_break_settings(&mut self, interval: u64, duration: u64) -> Result<(), SettingsError> {
        self.update_break_settings(BreakCategory::Regular, interval, duration)
    }

    pub fn update_micro_break_settings(&mut self, interval: u64, duration: u64) -> Result<(), SettingsError> {
        self.update_break_settings(BreakCategory::Micro, interval, duration)
    }

    pub fn update_water_break_settings(&mut self, interval: u64, duration: u64) -> Result<(), SettingsError> {
        self.update_break_settings(BreakCategory::Water, interval, duration)
    }

    /// Brings the engine in line with settings edited elsewhere.
    ///
    /// Only fields that differ are applied, each through its own mutator. An
    /// interval change restarts that timer; a duration-only change is stored
    /// without a restart. Master off is applied first and master on last, so
    /// no timer is started from half-applied settings.
    pub fn apply_settings(&mut self, config: Config, custom_breaks: Vec<CustomBreak>) {
        let current = self.settings.config().clone();

        if current.enabled && !config.enabled {
            self.set_enabled(false);
        }

        for category in BreakCategory::SCHEDULED {
            let (Some(old), Some(new)) = (current.schedule(category).copied(), config.schedule(category).copied()) else {
                continue;
            };

            if old.interval != new.interval && old.enabled == new.enabled {
                if let Err(e) = self.update_break_settings(category, new.interval, new.duration) {
                    msg_warning!(Message::SettingsRejected(e.to_string()));
                }
            } else if old.interval != new.interval || old.duration != new.duration {
                if let Err(e) = self.settings.set_schedule(category, new.interval, new.duration) {
                    msg_warning!(Message::SettingsRejected(e.to_string()));
                }
            }

            if old.enabled != new.enabled {
                if let Err(e) = self.set_category_enabled(category, new.enabled) {
                    msg_warning!(Message::SettingsRejected(e.to_string()));
                }
            }
        }

        if current.custom_breaks_enabled != config.custom_breaks_enabled {
            self.set_custom_breaks_enabled(config.custom_breaks_enabled);
        }

        self.apply_custom_breaks(custom_breaks);

        if current.start_at_login != config.start_at_login {
            self.set_start_at_login(config.start_at_login);
        }
        if current.settings_poll_interval != config.settings_poll_interval {
            self.settings.set_settings_poll_interval(config.settings_poll_interval);
        }

        if !current.enabled && config.enabled {
            self.set_enabled(true);
        }
    }

    fn apply_custom_breaks(&mut self, incoming: Vec<CustomBreak>) {
        let incoming: Vec<CustomBreak> = incoming.into_iter().map(|definition| normalize_custom_break(definition).0).collect();
        if incoming.as_slice() == self.settings.custom_breaks() {
            return;
        }

        let removed: Vec<Uuid> = self
            .settings
            .custom_breaks()
            .iter()
            .map(|definition| definition.id)
            .filter(|id| !incoming.iter().any(|definition| definition.id == *id))
            .collect();
        for id in removed {
            self.remove_custom_break(id);
        }

        for definition in &incoming {
            match self.custom_index.get(&definition.id) {
                None => {
                    self.add_custom_break(definition.clone());
                }
                Some(current) if current != definition => {
                    self.update_custom_break(definition.clone());
                }
                Some(_) => {}
            }
        }

        // Same definitions, possibly in a new order
        if incoming.as_slice() != self.settings.custom_breaks() {
            self.settings.set_custom_breaks(incoming);
            self.reindex_custom_breaks();
        }
    }

    // ---- break actions ----------------------------------------------------

    /// Pushes the next regular break one full interval out from now.
    pub fn skip_next_break(&mut self) {
        self.restart_regular_timer();
    }

    /// Starts a regular break immediately with the configured regular duration.
    ///
    /// Subject to the same gates as a timer fire, but not recorded as scheduled.
    pub fn start_break_now(&mut self) {
        self.trigger(Trigger::Manual(BreakCategory::Regular));
    }

    /// Ends session `session` as skipped. Ignored when that session already finished.
    pub fn skip_break(&mut self, session: SessionId) {
        self.finish(session, BreakOutcome::Skipped);
    }

    /// Skips whatever break is on screen. Returns `false` when there was none.
    pub fn skip_active_break(&mut self) -> bool {
        match self.active.as_ref().map(|active| active.session.id) {
            Some(session) => {
                self.skip_break(session);
                true
            }
            None => false,
        }
    }

    // ---- custom breaks ----------------------------------------------------

    /// Custom break definitions in stored order.
    pub fn custom_breaks(&self) -> &[CustomBreak] {
        self.settings.custom_breaks()
    }

    /// Normalizes and appends `definition`, starting its timer when it is live.
    ///
    /// Returns whether normalization changed the requested values. A
    /// definition whose id is already known is treated as an update.
    pub fn add_custom_break(&mut self, definition: CustomBreak) -> bool {
        if self.custom_index.contains_key(&definition.id) {
            return self.update_custom_break(definition).unwrap_or(false);
        }

        let (definition, adjusted) = normalize_custom_break(definition);
        let id = definition.id;
        let mut definitions = self.settings.custom_breaks().to_vec();
        definitions.push(definition);
        self.settings.set_custom_breaks(definitions);
        self.reindex_custom_breaks();

        if self.custom_index.get(&id).is_some_and(|definition| self.custom_gate(definition)) {
            self.restart_custom_timer(id);
        }
        adjusted
    }

    /// Normalizes `definition` and replaces the stored entry with the same id.
    ///
    /// Returns `None` when no such entry exists, otherwise whether
    /// normalization changed the requested values. With the master toggle on,
    /// the timer is restarted if the definition is live and stopped if not.
    pub fn update_custom_break(&mut self, definition: CustomBreak) -> Option<bool> {
        let (definition, adjusted) = normalize_custom_break(definition);
        let id = definition.id;

        let mut definitions = self.settings.custom_breaks().to_vec();
        let slot = definitions.iter_mut().find(|existing| existing.id == id)?;
        *slot = definition;
        self.settings.set_custom_breaks(definitions);
        self.reindex_custom_breaks();

        if self.settings.is_enabled() {
            if self.custom_index.get(&id).is_some_and(|definition| self.custom_gate(definition)) {
                self.restart_custom_timer(id);
            } else {
                self.stop_custom_timer(id);
            }
        }
        Some(adjusted)
    }

    /// Deletes the definition and always stops its timer. Returns whether a definition was removed.
    pub fn remove_custom_break(&mut self, id: Uuid) -> bool {
        let mut definitions = self.settings.custom_breaks().to_vec();
        let before = definitions.len();
        definitions.retain(|definition| definition.id != id);
        let removed = definitions.len() != before;

        if removed {
            self.settings.set_custom_breaks(definitions);
            self.reindex_custom_breaks();
        }
        self.stop_custom_timer(id);
        removed
    }

    // ---- runtime ----------------------------------------------------------

    /// Processes one queued command.
    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Skip(session) => self.skip_break(session),
            EngineCommand::StartBreakNow => self.start_break_now(),
            EngineCommand::SkipNextBreak => self.skip_next_break(),
            EngineCommand::SkipActiveBreak => {
                if !self.skip_active_break() {
                    msg_info!(Message::NoActiveBreak);
                }
            }
            EngineCommand::SetEnabled(enabled) => self.set_enabled(enabled),
            EngineCommand::ToggleEnabled => {
                self.toggle_enabled();
            }
            EngineCommand::ReloadSettings { config, custom_breaks } => self.apply_settings(config, custom_breaks),
        }
    }

    /// Processes everything due at the current time, oldest first.
    ///
    /// A completion and a timer fire due at the same instant are processed
    /// completion first. Returns the number of events processed.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut processed = 0;

        while let Some(due) = self.next_due(now) {
            match due {
                Due::Completion(session) => self.finish(session, BreakOutcome::Taken),
                Due::Fire(key) => self.fire(key, now),
            }
            processed += 1;
        }
        processed
    }

    /// Earliest exact instant something becomes due.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.timers().map(TimerHandle::next_fire).chain(self.completion_deadline()).min()
    }

    /// When the runtime should wake up next.
    ///
    /// Timer fires may be delayed up to their tolerance so that fires close
    /// together share one wakeup: the result is the latest due instant that
    /// still falls before every timer's tolerance window closes. Completion
    /// deadlines have no tolerance.
    pub fn next_wake(&self) -> Option<NaiveDateTime> {
        let window_end = self.timers().map(TimerHandle::latest_fire).chain(self.completion_deadline()).min()?;

        self.timers()
            .map(TimerHandle::next_fire)
            .chain(self.completion_deadline())
            .filter(|at| *at <= window_end)
            .max()
    }

    // ---- queries ----------------------------------------------------------

    pub fn is_on_break(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_session(&self) -> Option<&BreakSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    /// Next fire of a scheduled category's timer, `None` when it is not running.
    pub fn next_fire(&self, category: BreakCategory) -> Option<NaiveDateTime> {
        self.timer(category).map(TimerHandle::next_fire)
    }

    pub fn next_custom_fire(&self, id: Uuid) -> Option<NaiveDateTime> {
        self.custom_timers.get(&id).map(TimerHandle::next_fire)
    }

    /// Running custom breaks with their next fire, soonest first.
    pub fn next_custom_breaks(&self) -> Vec<(CustomBreak, NaiveDateTime)> {
        let mut upcoming: Vec<(CustomBreak, NaiveDateTime)> = self
            .custom_timers
            .iter()
            .filter_map(|(id, timer)| self.custom_index.get(id).map(|definition| (definition.clone(), timer.next_fire())))
            .collect();
        upcoming.sort_by_key(|(definition, at)| (*at, definition.id));
        upcoming
    }

    /// Number of live timers across all categories and custom breaks.
    pub fn timer_count(&self) -> usize {
        self.timers().count()
    }

    // ---- internals --------------------------------------------------------

    fn emit(&self, event: EngineEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }

    fn timer(&self, category: BreakCategory) -> Option<&TimerHandle> {
        match category {
            BreakCategory::Regular => self.regular_timer.as_ref(),
            BreakCategory::Micro => self.micro_timer.as_ref(),
            BreakCategory::Water => self.water_timer.as_ref(),
            BreakCategory::Custom => None,
        }
    }

    fn timer_slot(&mut self, category: BreakCategory) -> Option<&mut Option<TimerHandle>> {
        match category {
            BreakCategory::Regular => Some(&mut self.regular_timer),
            BreakCategory::Micro => Some(&mut self.micro_timer),
            BreakCategory::Water => Some(&mut self.water_timer),
            BreakCategory::Custom => None,
        }
    }

    fn timer_mut(&mut self, key: TimerKey) -> Option<&mut TimerHandle> {
        match key {
            TimerKey::Category(category) => self.timer_slot(category).and_then(Option::as_mut),
            TimerKey::Custom(id) => self.custom_timers.get_mut(&id),
        }
    }

    fn timers(&self) -> impl Iterator<Item = &TimerHandle> {
        [&self.regular_timer, &self.micro_timer, &self.water_timer]
            .into_iter()
            .flatten()
            .chain(self.custom_timers.values())
    }

    fn completion_deadline(&self) -> Option<NaiveDateTime> {
        self.active.as_ref().map(|active| active.session.completes_at)
    }

    fn category_gate(&self, category: BreakCategory) -> bool {
        self.settings.is_enabled() && self.settings.schedule(category).is_some_and(|schedule| schedule.enabled)
    }

    fn custom_gate(&self, definition: &CustomBreak) -> bool {
        self.settings.is_enabled() && self.settings.config().custom_breaks_enabled && definition.enabled
    }

    fn reindex_custom_breaks(&mut self) {
        self.custom_index = self
            .settings
            .custom_breaks()
            .iter()
            .map(|definition| (definition.id, definition.clone()))
            .collect();
    }

    fn start_custom_timers(&mut self) {
        let pending: Vec<(Uuid, u64)> = self
            .settings
            .custom_breaks()
            .iter()
            .filter(|definition| definition.enabled && !self.custom_timers.contains_key(&definition.id))
            .map(|definition| (definition.id, definition.interval))
            .collect();

        for (id, interval) in pending {
            self.install_timer(TimerKey::Custom(id), interval);
        }
    }

    fn stop_custom_timers(&mut self) {
        let ids: Vec<Uuid> = self.custom_timers.keys().copied().collect();
        for id in ids {
            self.cancel_timer(TimerKey::Custom(id));
        }
    }

    /// Stores a new handle for `key`; any previous handle must already be cancelled.
    fn install_timer(&mut self, key: TimerKey, interval: u64) {
        let handle = TimerHandle::schedule(key, interval, self.clock.now());
        let next_fire = handle.next_fire();

        match key {
            TimerKey::Category(category) => {
                if let Some(slot) = self.timer_slot(category) {
                    *slot = Some(handle);
                }
            }
            TimerKey::Custom(id) => {
                self.custom_timers.insert(id, handle);
            }
        }

        msg_debug!(Message::TimerScheduled(key.to_string(), next_fire));
        self.emit(EngineEvent::TimerScheduled { key, next_fire });
    }

    fn cancel_timer(&mut self, key: TimerKey) -> bool {
        let removed = match key {
            TimerKey::Category(category) => self.timer_slot(category).and_then(Option::take),
            TimerKey::Custom(id) => self.custom_timers.remove(&id),
        };

        if removed.is_some() {
            msg_debug!(Message::TimerCancelled(key.to_string()));
            self.emit(EngineEvent::TimerCancelled { key });
            true
        } else {
            false
        }
    }

    fn next_due(&self, now: NaiveDateTime) -> Option<Due> {
        let completion = self
            .active
            .as_ref()
            .filter(|active| active.session.completes_at <= now)
            .map(|active| (active.session.completes_at, Due::Completion(active.session.id)));

        let fire = self
            .timers()
            .filter(|timer| timer.is_due(now))
            .min_by_key(|timer| (timer.next_fire(), timer.key()))
            .map(|timer| (timer.next_fire(), Due::Fire(timer.key())));

        match (completion, fire) {
            (Some((completes_at, completion)), Some((fires_at, fire))) => Some(if fires_at < completes_at { fire } else { completion }),
            (completion, fire) => completion.or(fire).map(|(_, due)| due),
        }
    }

    fn fire(&mut self, key: TimerKey, now: NaiveDateTime) {
        match self.timer_mut(key) {
            Some(timer) => timer.advance(now),
            None => return,
        }

        if let TimerKey::Custom(id) = key {
            // Resolve the definition as it is now, not as it was when the timer started
            match self.custom_index.get(&id).map(|definition| self.custom_gate(definition)) {
                None => {
                    msg_debug!(Message::StaleCustomTimer(id.to_string()));
                    self.cancel_timer(key);
                    return;
                }
                Some(false) => {
                    self.cancel_timer(key);
                    return;
                }
                Some(true) => {}
            }
        }

        self.trigger(Trigger::Timer(key));
    }

    fn plan(&self, trigger: Trigger) -> Option<BreakPlan> {
        let category = match trigger {
            Trigger::Timer(TimerKey::Custom(id)) => {
                let definition = self.custom_index.get(&id)?;
                return Some(BreakPlan {
                    tag: definition.tag(),
                    category: BreakCategory::Custom,
                    custom_id: Some(id),
                    title: definition.name.clone(),
                    icon: definition.display_icon().to_string(),
                    duration: definition.duration,
                });
            }
            Trigger::Timer(TimerKey::Category(category)) | Trigger::Manual(category) => category,
        };

        Some(BreakPlan {
            tag: BreakTag::for_category(category)?,
            category,
            custom_id: None,
            title: category.title().to_string(),
            icon: category.icon().to_string(),
            duration: self.settings.schedule(category)?.duration,
        })
    }

    fn trigger(&mut self, trigger: Trigger) {
        if !self.settings.is_enabled() {
            msg_debug!(Message::BreaksDisabledNoTimers);
            return;
        }
        let Some(plan) = self.plan(trigger) else {
            return;
        };

        if self.active.is_some() {
            msg_debug!(Message::TriggerDropped(plan.tag.to_string()));
            self.emit(EngineEvent::TriggerDropped { tag: plan.tag });
            return;
        }

        let now = self.clock.now();
        if let Trigger::Timer(_) = trigger {
            self.statistics.record_scheduled(&plan.tag, now);
        }

        let id = self.next_session;
        self.next_session += 1;

        let session = BreakSession {
            id,
            tag: plan.tag,
            category: plan.category,
            custom_id: plan.custom_id,
            title: plan.title,
            icon: plan.icon,
            duration: plan.duration,
            started_at: now,
            completes_at: now + Duration::seconds(plan.duration.max(1) as i64),
        };
        let request = OverlayRequest {
            session: id,
            category: session.category,
            title: session.title.clone(),
            icon: session.icon.clone(),
            duration: session.duration,
        };

        let overlay = self.presenter.present(&request, SkipTrigger::new(id, self.sender.clone()));
        msg_info!(Message::BreakStarted(session.title.clone(), session.duration));
        self.emit(EngineEvent::BreakStarted {
            session: id,
            tag: session.tag.clone(),
            duration: session.duration,
        });
        let category = session.category;
        self.active = Some(ActiveBreak { session, overlay });

        // Micro cadence counts from the start of the break
        if category == BreakCategory::Micro {
            self.restart_micro_timer();
        }
    }

    fn finish(&mut self, session: SessionId, outcome: BreakOutcome) {
        if self.active.as_ref().map(|active| active.session.id) != Some(session) {
            msg_debug!(Message::SessionAlreadyFinished(session));
            return;
        }
        let Some(mut active) = self.active.take() else {
            return;
        };

        let now = self.clock.now();
        let session = active.session;
        match outcome {
            BreakOutcome::Taken => self.statistics.record_taken(&session.tag, session.started_at, now, session.duration),
            BreakOutcome::Skipped => self.statistics.record_skipped(&session.tag, session.started_at, now),
            BreakOutcome::Cancelled => {}
        }
        active.overlay.dismiss();

        match outcome {
            BreakOutcome::Skipped => msg_info!(Message::BreakSkipped(session.title.clone())),
            _ => msg_info!(Message::BreakFinished(session.title.clone())),
        }
        self.emit(EngineEvent::BreakEnded {
            session: session.id,
            tag: session.tag.clone(),
            outcome,
        });

        match session.category {
            BreakCategory::Regular => self.restart_regular_timer(),
            BreakCategory::Water => self.restart_water_timer(),
            BreakCategory::Micro => {}
            BreakCategory::Custom => {
                if let Some(id) = session.custom_id {
                    self.restart_custom_timer(id);
                }
            }
        }
    }
}
