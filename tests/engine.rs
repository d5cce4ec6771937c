mod common;

#[cfg(test)]
mod tests {
    use super::common::{at, regular_only, Harness, Recorded};
    use lumin::libs::breaks::{BreakCategory, BreakTag};
    use lumin::libs::config::Config;
    use lumin::libs::engine::{BreakOutcome, EngineEvent};
    use lumin::libs::settings::SettingsError;
    use lumin::libs::timer::TimerKey;

    #[test]
    fn test_regular_break_taken_restarts_from_completion() {
        let mut h = Harness::started(regular_only(), Vec::new());
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1200)));

        h.advance_to(at(1200));
        assert!(h.engine.is_on_break());
        let requests = h.overlay.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].duration, 20);
        assert_eq!(requests[0].title, "Look away from the screen");
        assert_eq!(requests[0].icon, "eye");

        h.advance_to(at(1220));
        assert!(!h.engine.is_on_break());
        assert_eq!(
            h.statistics.taken(),
            vec![Recorded::Taken(BreakTag::Regular, at(1200), at(1220), 20)]
        );
        assert!(h.statistics.skipped().is_empty());
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(2420)));
        assert_eq!(h.overlay.dismissed(), vec![requests[0].session]);
    }

    #[test]
    fn test_regular_break_skipped_restarts_from_skip() {
        let mut h = Harness::started(regular_only(), Vec::new());

        h.advance_to(at(1205));
        assert!(h.engine.is_on_break());
        h.skip_current();

        assert!(!h.engine.is_on_break());
        assert_eq!(
            h.statistics.skipped(),
            vec![Recorded::Skipped(BreakTag::Regular, at(1200), at(1205))]
        );
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(2405)));

        // The original completion deadline passes without a second finish
        h.advance_to(at(1230));
        assert!(h.statistics.taken().is_empty());
        assert_eq!(h.statistics.skipped().len(), 1);
        assert_eq!(h.overlay.dismissed().len(), 1);
    }

    #[test]
    fn test_skip_after_completion_is_ignored() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.advance_to(at(1200));
        let trigger = h.overlay.take_trigger();

        h.advance_to(at(1220));
        trigger.fire();
        h.drain();

        assert_eq!(h.statistics.taken().len(), 1);
        assert!(h.statistics.skipped().is_empty());
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(2420)));
    }

    #[test]
    fn test_trigger_during_break_is_dropped() {
        let mut config = regular_only();
        config.regular.interval = 600;
        config.regular.duration = 120;
        config.micro.enabled = true;
        config.micro.interval = 660;

        let mut h = Harness::started(config, Vec::new());
        h.advance_to(at(700));

        assert_eq!(h.overlay.requests().len(), 1);
        assert_eq!(h.engine.active_session().map(|s| s.category), Some(BreakCategory::Regular));
        assert_eq!(h.statistics.scheduled(), vec![Recorded::Scheduled(BreakTag::Regular, at(600))]);
        assert!(h
            .events()
            .iter()
            .any(|event| *event == EngineEvent::TriggerDropped { tag: BreakTag::Micro }));
        // The dropped fire still moves the micro timer on by one period
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(1320)));
    }

    #[test]
    fn test_at_most_one_break_at_a_time() {
        let mut config = Config::default();
        config.regular.interval = 300;
        config.regular.duration = 200;
        config.micro.interval = 120;
        config.micro.duration = 30;
        config.water.interval = 180;
        config.water.duration = 90;

        let mut h = Harness::started(config, Vec::new());
        h.advance_to(at(3 * 3600));

        let mut on_screen = 0i32;
        for event in h.events() {
            match event {
                EngineEvent::BreakStarted { .. } => {
                    on_screen += 1;
                    assert_eq!(on_screen, 1);
                }
                EngineEvent::BreakEnded { .. } => on_screen -= 1,
                _ => {}
            }
        }

        let presented = h.overlay.requests().len();
        let finished = h.statistics.taken().len() + h.statistics.skipped().len();
        assert!(presented > 3);
        assert_eq!(presented - finished, usize::from(h.engine.is_on_break()));
        assert_eq!(h.statistics.scheduled().len(), presented);
    }

    #[test]
    fn test_water_interval_change_leaves_other_timers() {
        let mut h = Harness::started(Config::default(), Vec::new());
        h.advance_to(at(100));

        h.engine.update_water_break_settings(2400, 5).unwrap();

        assert_eq!(h.engine.next_fire(BreakCategory::Water), Some(at(2500)));
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1200)));
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(300)));
    }

    #[test]
    fn test_micro_timer_restarts_at_trigger() {
        let mut config = Config::default();
        config.regular.enabled = false;
        config.water.enabled = false;

        let mut h = Harness::started(config, Vec::new());
        h.advance_to(at(300));

        assert!(h.engine.is_on_break());
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(600)));

        h.advance_to(at(302));
        assert!(!h.engine.is_on_break());
        assert_eq!(h.statistics.taken(), vec![Recorded::Taken(BreakTag::Micro, at(300), at(302), 2)]);
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(600)));
    }

    #[test]
    fn test_water_timer_restarts_at_completion() {
        let mut config = Config::default();
        config.regular.enabled = false;
        config.micro.enabled = false;

        let mut h = Harness::started(config, Vec::new());
        h.advance_to(at(1805));

        let request = &h.overlay.requests()[0];
        assert_eq!(request.title, "Take a sip of water");
        assert_eq!(request.icon, "drop");
        assert_eq!(h.engine.next_fire(BreakCategory::Water), Some(at(3605)));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.advance_to(at(100));

        let err = h.engine.update_regular_break_settings(30, 20).unwrap_err();
        assert!(matches!(err, SettingsError::IntervalOutOfRange { value: 30, .. }));

        // Valid interval, invalid duration: neither value is written
        let err = h.engine.update_regular_break_settings(900, 0).unwrap_err();
        assert!(matches!(err, SettingsError::DurationOutOfRange { value: 0, .. }));

        let err = h.engine.update_water_break_settings(4000, 5).unwrap_err();
        assert!(matches!(err, SettingsError::IntervalOutOfRange { max: 3600, .. }));

        let schedule = h.engine.settings().schedule(BreakCategory::Regular).unwrap();
        assert_eq!((schedule.interval, schedule.duration), (1200, 20));
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1200)));
    }

    #[test]
    fn test_duration_change_during_break_applies_to_next_break() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.advance_to(at(1205));

        h.engine.update_regular_break_settings(1200, 40).unwrap();
        assert_eq!(h.engine.active_session().map(|s| s.duration), Some(20));

        h.advance_to(at(1220));
        assert_eq!(h.statistics.taken(), vec![Recorded::Taken(BreakTag::Regular, at(1200), at(1220), 20)]);
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(2420)));

        h.advance_to(at(2420));
        assert_eq!(h.overlay.requests().last().map(|r| r.duration), Some(40));
    }

    #[test]
    fn test_master_toggle_stops_and_starts_timers() {
        let mut h = Harness::started(Config::default(), Vec::new());
        assert_eq!(h.engine.timer_count(), 3);

        h.advance_to(at(50));
        h.engine.set_enabled(false);
        assert_eq!(h.engine.timer_count(), 0);

        h.engine.start_all_timers();
        assert_eq!(h.engine.timer_count(), 0);

        h.advance_to(at(100));
        assert!(h.engine.toggle_enabled());
        assert_eq!(h.engine.timer_count(), 3);
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1300)));
        assert!(h.events().contains(&EngineEvent::EnabledChanged(false)));
        assert!(h.events().contains(&EngineEvent::EnabledChanged(true)));
    }

    #[test]
    fn test_start_all_timers_keeps_running_countdowns() {
        let mut h = Harness::started(Config::default(), Vec::new());
        h.advance_to(at(100));

        h.engine.start_all_timers();
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1200)));
        assert_eq!(h.engine.next_fire(BreakCategory::Water), Some(at(1800)));
    }

    #[test]
    fn test_category_toggle_is_selective() {
        let mut h = Harness::started(Config::default(), Vec::new());
        h.advance_to(at(100));

        h.engine.set_category_enabled(BreakCategory::Micro, false).unwrap();
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), None);
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1200)));

        h.advance_to(at(200));
        h.engine.set_category_enabled(BreakCategory::Micro, true).unwrap();
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(500)));

        assert!(matches!(
            h.engine.set_category_enabled(BreakCategory::Custom, true),
            Err(SettingsError::NotSchedulable(BreakCategory::Custom))
        ));
    }

    #[test]
    fn test_stop_all_cancels_break_without_statistics() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.advance_to(at(1200));
        let session = h.engine.active_session().unwrap().id;

        h.engine.stop_all_timers();

        assert!(!h.engine.is_on_break());
        assert_eq!(h.engine.timer_count(), 0);
        assert!(h.statistics.taken().is_empty());
        assert!(h.statistics.skipped().is_empty());
        assert_eq!(h.overlay.dismissed(), vec![session]);
        assert!(h.events().contains(&EngineEvent::BreakEnded {
            session,
            tag: BreakTag::Regular,
            outcome: BreakOutcome::Cancelled,
        }));

        h.advance_to(at(5000));
        assert_eq!(h.overlay.requests().len(), 1);
    }

    #[test]
    fn test_skip_next_break_pushes_regular_timer() {
        let mut h = Harness::started(Config::default(), Vec::new());
        h.advance_to(at(250));

        h.engine.skip_next_break();

        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1450)));
        assert_eq!(h.engine.next_fire(BreakCategory::Micro), Some(at(300)));
    }

    #[test]
    fn test_start_break_now_is_not_recorded_as_scheduled() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.advance_to(at(500));

        h.engine.start_break_now();
        assert!(h.engine.is_on_break());
        assert!(h.statistics.scheduled().is_empty());

        h.advance_to(at(520));
        assert_eq!(h.statistics.taken(), vec![Recorded::Taken(BreakTag::Regular, at(500), at(520), 20)]);
        assert_eq!(h.engine.next_fire(BreakCategory::Regular), Some(at(1720)));
    }

    #[test]
    fn test_start_break_now_ignored_when_disabled() {
        let mut config = regular_only();
        config.enabled = false;
        let mut h = Harness::started(config, Vec::new());

        h.engine.start_break_now();
        assert!(!h.engine.is_on_break());
        assert!(h.overlay.requests().is_empty());
    }

    #[test]
    fn test_zero_duration_break_is_shown_for_one_second() {
        let mut config = regular_only();
        config.regular.duration = 0;
        let mut h = Harness::started(config, Vec::new());

        h.advance_to(at(1200));
        assert_eq!(h.engine.active_session().map(|s| s.completes_at), Some(at(1201)));

        h.advance_to(at(1201));
        assert_eq!(h.statistics.taken(), vec![Recorded::Taken(BreakTag::Regular, at(1200), at(1201), 0)]);
    }

    #[test]
    fn test_next_wake_coalesces_nearby_fires() {
        let mut config = regular_only();
        config.micro.enabled = true;
        config.micro.interval = 1250;

        let mut h = Harness::started(config, Vec::new());
        assert_eq!(h.engine.next_deadline(), Some(at(1200)));
        assert_eq!(h.engine.next_wake(), Some(at(1250)));

        h.clock.set(at(1250));
        assert_eq!(h.engine.tick(), 2);
        assert_eq!(h.engine.active_session().map(|s| s.category), Some(BreakCategory::Regular));
        assert!(h
            .events()
            .contains(&EngineEvent::TriggerDropped { tag: BreakTag::Micro }));
    }

    #[test]
    fn test_restart_emits_cancel_then_schedule() {
        let mut h = Harness::started(regular_only(), Vec::new());
        h.events.lock().unwrap().clear();

        h.engine.restart_regular_timer();

        let key = TimerKey::Category(BreakCategory::Regular);
        assert_eq!(
            h.events(),
            vec![
                EngineEvent::TimerCancelled { key },
                EngineEvent::TimerScheduled {
                    key,
                    next_fire: at(1200)
                },
            ]
        );
    }
}
