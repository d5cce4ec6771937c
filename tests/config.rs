#[cfg(test)]
mod tests {
    use lumin::libs::breaks::CustomBreak;
    use lumin::libs::config::{
        read_custom_breaks_from, try_read_custom_breaks_from, write_custom_breaks_to, CategorySchedule, Config, CONFIG_FILE_NAME,
        CUSTOM_BREAKS_FILE_NAME,
    };
    use lumin::libs::data_storage::DataStorage;
    use std::fs;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        storage: DataStorage,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let storage = DataStorage::with_base(temp_dir.path().join("lumin"));
            ConfigTestContext {
                _temp_dir: temp_dir,
                storage,
            }
        }
    }

    #[test]
    fn test_default_schedules() {
        let config = Config::default();

        assert!(config.enabled);
        assert_eq!(config.regular, CategorySchedule::new(1_200, 20));
        assert_eq!(config.micro, CategorySchedule::new(300, 2));
        assert_eq!(config.water, CategorySchedule::new(1_800, 5));
        assert!(config.custom_breaks_enabled);
        assert!(!config.start_at_login);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_reads_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();
        config.enabled = false;
        config.water.interval = 2_400;
        config.micro.enabled = false;
        config.save_to(&ctx.storage).unwrap();

        let loaded = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(loaded, config);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_fills_defaults(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        fs::write(&path, r#"{ "enabled": false, "regular": { "interval": 900, "duration": 30, "enabled": true } }"#).unwrap();

        let config = Config::read_from(&ctx.storage).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.regular, CategorySchedule::new(900, 30));
        assert_eq!(config.micro, Config::default().micro);
        assert_eq!(config.settings_poll_interval, Config::default().settings_poll_interval);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_file_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::read_from(&ctx.storage).is_err());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_custom_breaks_file(ctx: &mut ConfigTestContext) {
        assert!(read_custom_breaks_from(&ctx.storage).is_empty());

        let stretch = CustomBreak::new("Stretch", "star", 1_800, 60);
        let eyes = CustomBreak::new("Eyes", "eye", 600, 10);
        write_custom_breaks_to(&ctx.storage, &[stretch.clone(), eyes.clone()]).unwrap();

        let loaded = read_custom_breaks_from(&ctx.storage);
        assert_eq!(loaded, vec![stretch, eyes]);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_undecodable_custom_breaks_are_an_error_for_writers(ctx: &mut ConfigTestContext) {
        assert_eq!(try_read_custom_breaks_from(&ctx.storage).unwrap(), Vec::new());

        let path = ctx.storage.get_path(CUSTOM_BREAKS_FILE_NAME).unwrap();
        fs::write(&path, r#"[{"id":"6f1c2a8e-3b0d-4c55-9d7e-2a1b3c4d5e6f","name":"Stretch","interval":1800,"duration":60},]"#).unwrap();

        assert!(try_read_custom_breaks_from(&ctx.storage).is_err());
        assert!(read_custom_breaks_from(&ctx.storage).is_empty());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_writes_replace_files_whole(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CUSTOM_BREAKS_FILE_NAME).unwrap();
        fs::write(&path, "x".repeat(4_096)).unwrap();

        write_custom_breaks_to(&ctx.storage, &[]).unwrap();
        Config::default().save_to(&ctx.storage).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        let leftovers: Vec<_> = fs::read_dir(ctx.storage.base_path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_schedule_lookup() {
        use lumin::libs::breaks::BreakCategory;

        let mut config = Config::default();
        assert_eq!(config.schedule(BreakCategory::Water).map(|s| s.interval), Some(1_800));
        assert!(config.schedule(BreakCategory::Custom).is_none());

        if let Some(schedule) = config.schedule_mut(BreakCategory::Micro) {
            schedule.duration = 5;
        }
        assert_eq!(config.micro.duration, 5);
    }
}
