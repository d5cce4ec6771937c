#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use lumin::commands::control::SkipArgs;
    use lumin::commands::custom::{ensure_readable, find_custom_break};
    use lumin::commands::Cli;
    use lumin::libs::breaks::CustomBreak;
    use lumin::libs::config::{write_custom_breaks_to, CUSTOM_BREAKS_FILE_NAME};
    use lumin::libs::control::ControlRequest;
    use lumin::libs::data_storage::DataStorage;
    use uuid::Uuid;

    fn with_id(id: &str, name: &str) -> CustomBreak {
        CustomBreak {
            id: Uuid::parse_str(id).unwrap(),
            ..CustomBreak::new(name, "star", 1_800, 60)
        }
    }

    fn definitions() -> Vec<CustomBreak> {
        vec![
            with_id("aaaaaaaa-0000-4000-8000-000000000001", "Stretch"),
            with_id("aaaaaaaa-0000-4000-8000-000000000002", "Eyes"),
            with_id("bbbbbbbb-0000-4000-8000-000000000003", "Walk"),
        ]
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_subcommands() {
        assert!(Cli::try_parse_from(["lumin", "run"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "config", "set", "water", "--interval", "2400"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "config", "disable", "micro"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "custom", "add", "--name", "Stretch", "--interval", "1800", "--duration", "60"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "stats", "--days", "14"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "export", "--format", "json"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "--daemon-run"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "break"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "skip"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "skip", "--current"]).is_ok());
        assert!(Cli::try_parse_from(["lumin", "toggle"]).is_ok());
    }

    #[test]
    fn test_skip_picks_request() {
        assert_eq!(SkipArgs { current: false }.request(), ControlRequest::SkipNextBreak);
        assert_eq!(SkipArgs { current: true }.request(), ControlRequest::SkipActiveBreak);
    }

    #[test]
    fn test_custom_edits_refuse_unreadable_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = DataStorage::with_base(temp_dir.path().join("lumin"));
        assert!(ensure_readable(&storage).is_ok());

        write_custom_breaks_to(&storage, &definitions()).unwrap();
        assert!(ensure_readable(&storage).is_ok());

        std::fs::write(storage.get_path(CUSTOM_BREAKS_FILE_NAME).unwrap(), "[{\"name\": ").unwrap();
        assert!(ensure_readable(&storage).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["lumin", "config", "disable", "lunch"]).is_err());
        assert!(Cli::try_parse_from(["lumin", "export", "--format", "xlsx"]).is_err());
        assert!(Cli::try_parse_from(["lumin", "custom", "add", "--name", "Stretch"]).is_err());
    }

    #[test]
    fn test_find_by_full_id() {
        let definitions = definitions();
        assert_eq!(find_custom_break(&definitions, "aaaaaaaa-0000-4000-8000-000000000002").unwrap(), 1);
    }

    #[test]
    fn test_find_by_unique_prefix() {
        let definitions = definitions();
        assert_eq!(find_custom_break(&definitions, "bbbb").unwrap(), 2);
        assert_eq!(find_custom_break(&definitions, "  BBBB ").unwrap(), 2);
    }

    #[test]
    fn test_find_ambiguous_or_missing() {
        let definitions = definitions();
        assert!(find_custom_break(&definitions, "aaaa").is_err());
        assert!(find_custom_break(&definitions, "cccc").is_err());
        assert!(find_custom_break(&definitions, "").is_err());
        assert!(find_custom_break(&[], "aaaa").is_err());
    }
}
