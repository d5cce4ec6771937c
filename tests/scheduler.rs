mod common;

#[cfg(test)]
mod tests {
    use super::common::{at, base_time, regular_only, RecordingOverlay, RecordingStatistics};
    use lumin::libs::breaks::{BreakCategory, BreakTag, CustomBreak};
    use lumin::libs::clock::{Clock, ManualClock};
    use lumin::libs::config::{write_custom_breaks_to, Config, CONFIG_FILE_NAME, CUSTOM_BREAKS_FILE_NAME};
    use lumin::libs::control::{send_request, ControlRequest, REQUESTS_FILE_NAME};
    use lumin::libs::data_storage::DataStorage;
    use lumin::libs::engine::{BreakOutcome, EngineCommand, EngineEvent, EngineSender, ScheduleEngine};
    use lumin::libs::scheduler::{Scheduler, SettingsWatcher};
    use lumin::libs::settings::SettingsStore;
    use lumin::libs::timer::TimerKey;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    struct Running {
        clock: Arc<ManualClock>,
        overlay: RecordingOverlay,
        statistics: RecordingStatistics,
        events: Arc<Mutex<Vec<EngineEvent>>>,
        sender: EngineSender,
        scheduler: Scheduler,
    }

    fn build(config: Config) -> Running {
        build_with(SettingsStore::in_memory(config, Vec::new()))
    }

    fn build_with(settings: SettingsStore) -> Running {
        let clock = Arc::new(ManualClock::new(base_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let overlay = RecordingOverlay::default();
        let statistics = RecordingStatistics::default();
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut engine = ScheduleEngine::new(
            settings,
            Box::new(statistics.clone()),
            Box::new(overlay.clone()),
            Arc::clone(&dyn_clock),
            sender.clone(),
        );
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        // The loop keeps countdowns that are already running
        engine.start_all_timers();

        Running {
            clock,
            overlay,
            statistics,
            events,
            sender,
            scheduler: Scheduler::new(engine, receiver, dyn_clock),
        }
    }

    /// Polls `condition` for up to three seconds.
    async fn wait_for(condition: impl Fn() -> bool) -> bool {
        for _ in 0..300 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    #[tokio::test]
    async fn test_commands_reach_the_engine() {
        let running = build(regular_only());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(running.scheduler.run(shutdown_rx));

        running.sender.send(EngineCommand::StartBreakNow).unwrap();
        let overlay = running.overlay.clone();
        assert!(wait_for(|| overlay.requests().len() == 1).await);

        // The overlay's skip button posts back into the same queue
        running.overlay.take_trigger().fire();
        let events = Arc::clone(&running.events);
        assert!(
            wait_for(|| {
                events.lock().unwrap().iter().any(|event| {
                    matches!(event, EngineEvent::BreakEnded { outcome: BreakOutcome::Skipped, .. })
                })
            })
            .await
        );

        shutdown_tx.send(()).unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert!(!engine.is_on_break());
        assert_eq!(engine.timer_count(), 0);
        assert_eq!(running.statistics.skipped().len(), 1);
    }

    #[tokio::test]
    async fn test_overdue_fire_starts_break_and_shutdown_cancels_it() {
        let running = build(regular_only());
        let Running {
            clock,
            overlay,
            statistics,
            events,
            scheduler,
            ..
        } = running;

        // Timers count from t = 0; the loop first wakes at t = 1200
        clock.set(at(1200));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        let shown = overlay.clone();
        assert!(wait_for(|| shown.requests().len() == 1).await);
        assert_eq!(overlay.requests()[0].category, BreakCategory::Regular);

        shutdown_tx.send(()).unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert!(!engine.is_on_break());

        assert!(statistics.taken().is_empty());
        let cancelled = events.lock().unwrap().iter().any(|event| {
            matches!(
                event,
                EngineEvent::BreakEnded {
                    tag: BreakTag::Regular,
                    outcome: BreakOutcome::Cancelled,
                    ..
                }
            )
        });
        assert!(cancelled);
    }

    #[tokio::test]
    async fn test_watcher_applies_settings_edits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));

        let mut config = regular_only();
        config.settings_poll_interval = 100;
        let running = build(config.clone());
        let watcher = SettingsWatcher::new(storage.clone());
        let scheduler = running.scheduler.with_watcher(watcher);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        config.regular.interval = 900;
        config.save_to(&storage).unwrap();

        let events = Arc::clone(&running.events);
        let rescheduled = wait_for(|| {
            events.lock().unwrap().iter().any(|event| {
                matches!(
                    event,
                    EngineEvent::TimerScheduled {
                        key: TimerKey::Category(BreakCategory::Regular),
                        next_fire,
                    } if *next_fire == at(900)
                )
            })
        })
        .await;
        assert!(rescheduled);

        shutdown_tx.send(()).unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert_eq!(engine.settings().config().regular.interval, 900);
    }

    #[test]
    fn test_watcher_reports_each_change_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));
        let mut watcher = SettingsWatcher::new(storage.clone());

        assert!(watcher.poll().is_none());
        assert!(!storage.get_path(CONFIG_FILE_NAME).unwrap().exists());

        let mut config = Config::default();
        config.water.enabled = false;
        config.save_to(&storage).unwrap();

        let reloaded = watcher.poll().unwrap();
        assert!(!reloaded.config.water.enabled);
        assert_eq!(reloaded.custom_breaks, Some(Vec::new()));
        assert!(watcher.poll().is_none());
    }

    fn corrupt(path: &std::path::Path) {
        // Trailing comma before the closing bracket
        let text = fs::read_to_string(path).unwrap();
        fs::write(path, format!("{},]", text.trim_end().trim_end_matches(']'))).unwrap();
    }

    fn has_event(events: &Arc<Mutex<Vec<EngineEvent>>>, wanted: impl Fn(&EngineEvent) -> bool) -> bool {
        events.lock().unwrap().iter().any(wanted)
    }

    #[test]
    fn test_watcher_tells_unreadable_custom_breaks_from_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));
        let mut watcher = SettingsWatcher::new(storage.clone());

        Config::default().save_to(&storage).unwrap();
        write_custom_breaks_to(&storage, &[CustomBreak::new("Stretch", "star", 1_800, 60)]).unwrap();
        corrupt(&storage.get_path(CUSTOM_BREAKS_FILE_NAME).unwrap());

        let reloaded = watcher.poll().unwrap();
        assert_eq!(reloaded.config, Config::default());
        assert_eq!(reloaded.custom_breaks, None);
    }

    #[tokio::test]
    async fn test_unreadable_custom_breaks_file_is_left_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));

        let mut config = regular_only();
        config.settings_poll_interval = 100;
        config.save_to(&storage).unwrap();
        let definitions = vec![
            CustomBreak::new("Stretch", "star", 1_800, 60),
            CustomBreak::new("Eyes", "eye", 2_400, 30),
        ];
        write_custom_breaks_to(&storage, &definitions).unwrap();

        let running = build_with(SettingsStore::open(storage.clone()));
        assert_eq!(running.scheduler.engine().custom_breaks().len(), 2);
        let scheduler = running.scheduler.with_watcher(SettingsWatcher::new(storage.clone()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        let custom_path = storage.get_path(CUSTOM_BREAKS_FILE_NAME).unwrap();
        corrupt(&custom_path);
        let damaged = fs::read_to_string(&custom_path).unwrap();
        config.regular.interval = 900;
        config.save_to(&storage).unwrap();

        // The config edit lands, so the damaged file was read alongside it
        let events = Arc::clone(&running.events);
        let reloaded = wait_for(|| {
            has_event(&events, |event| {
                matches!(
                    event,
                    EngineEvent::TimerScheduled {
                        key: TimerKey::Category(BreakCategory::Regular),
                        next_fire,
                    } if *next_fire == at(900)
                )
            })
        })
        .await;
        assert!(reloaded);

        shutdown_tx.send(()).unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert_eq!(engine.custom_breaks(), definitions.as_slice());
        assert_eq!(fs::read_to_string(&custom_path).unwrap(), damaged);
    }

    #[tokio::test]
    async fn test_cli_requests_reach_the_running_scheduler() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));

        let mut config = regular_only();
        config.settings_poll_interval = 100;
        let running = build(config);
        let scheduler = running.scheduler.with_watcher(SettingsWatcher::new(storage.clone()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        let events = Arc::clone(&running.events);

        send_request(&storage, ControlRequest::StartBreakNow).unwrap();
        let overlay = running.overlay.clone();
        assert!(wait_for(|| overlay.requests().len() == 1).await);

        send_request(&storage, ControlRequest::SkipActiveBreak).unwrap();
        assert!(
            wait_for(|| has_event(&events, |event| matches!(
                event,
                EngineEvent::BreakEnded { outcome: BreakOutcome::Skipped, .. }
            )))
            .await
        );

        running.clock.set(at(100));
        send_request(&storage, ControlRequest::SkipNextBreak).unwrap();
        assert!(
            wait_for(|| has_event(&events, |event| matches!(
                event,
                EngineEvent::TimerScheduled {
                    key: TimerKey::Category(BreakCategory::Regular),
                    next_fire,
                } if *next_fire == at(1300)
            )))
            .await
        );

        send_request(&storage, ControlRequest::ToggleEnabled).unwrap();
        assert!(wait_for(|| has_event(&events, |event| *event == EngineEvent::EnabledChanged(false))).await);

        shutdown_tx.send(()).unwrap();
        let engine = handle.await.unwrap().unwrap();
        assert!(!engine.settings().is_enabled());
        assert_eq!(running.statistics.skipped().len(), 1);
        assert!(!storage.get_path(REQUESTS_FILE_NAME).unwrap().exists());
    }

    #[test]
    fn test_watcher_discards_requests_from_an_earlier_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));
        send_request(&storage, ControlRequest::StartBreakNow).unwrap();

        let watcher = SettingsWatcher::new(storage.clone());
        assert!(watcher.take_requests().is_empty());

        send_request(&storage, ControlRequest::ToggleEnabled).unwrap();
        assert_eq!(watcher.take_requests(), vec![ControlRequest::ToggleEnabled]);
    }
}
