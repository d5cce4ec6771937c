//! User-facing text of every [`Message`].
//!
//! All wording lives here so call sites only pick a variant and its
//! parameters.

use super::types::Message;
use crate::libs::formatter::{format_seconds, format_time};
use std::fmt;

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === AUTOSTART MESSAGES ===
            Message::AutostartEnabled => "Lumin will start at login".to_string(),
            Message::AutostartDisabled => "Lumin will no longer start at login".to_string(),
            Message::AutostartAlreadyDisabled => "Start at login is already disabled".to_string(),
            Message::AutostartEnableFailed(error) => format!("Failed to enable start at login: {}", error),
            Message::AutostartDisableFailed(error) => format!("Failed to disable start at login: {}", error),
            Message::AutostartStatus(status) => format!("Start at login: {}", status),
            Message::AutostartStatusFailed(error) => format!("Could not check start at login: {}", error),
            Message::HomeDirectoryNotFound => "Home directory not found".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigLoadFailed(error) => format!("Failed to load settings, using defaults: {}", error),
            Message::ConfigSection(category) => format!("{} breaks", capitalize(category.as_str())),
            Message::ConfigNothingToSet => "Nothing to change: pass --interval and/or --duration".to_string(),
            Message::CategoryNotSchedulable(category) => {
                format!("'{}' has no schedule of its own; use `lumin custom` instead", category)
            }
            Message::SettingsPersistFailed(error) => format!("Failed to save settings: {}", error),
            Message::SettingsRejected(error) => format!("Invalid setting: {}", error),
            Message::SettingsReloaded => "Settings changed on disk, reloading".to_string(),
            Message::ScheduleUpdated(category) => format!("{} break schedule updated", capitalize(category.as_str())),
            Message::BreaksState(enabled) => format!("Breaks are {}", on_off(*enabled)),
            Message::BreaksToggled(enabled) => format!("All breaks {}", on_off(*enabled)),
            Message::CategoryToggled(category, enabled) => {
                format!("{} breaks {}", capitalize(category.as_str()), on_off(*enabled))
            }
            Message::CustomBreaksToggled(enabled) => format!("Custom breaks {}", on_off(*enabled)),
            Message::PromptBreaksEnabled => "Enable break reminders?".to_string(),
            Message::PromptCategoryEnabled(category) => format!("Enable {} breaks?", category),
            Message::PromptInterval(category) => format!("Seconds between {} breaks", category),
            Message::PromptDuration(category) => format!("Length of a {} break (seconds)", category),
            Message::PromptCustomBreaksEnabled => "Enable custom breaks?".to_string(),

            // === CUSTOM BREAK MESSAGES ===
            Message::CustomBreaksLoadFailed(error) => format!("Failed to load custom breaks, starting with none: {}", error),
            Message::CustomBreaksKept(error) => format!("Custom breaks file is unreadable, keeping the current definitions: {}", error),
            Message::CustomBreaksUnreadable(error) => format!("Custom breaks file is unreadable, fix or delete it before editing: {}", error),
            Message::CustomBreakAdded(name, id) => format!("Custom break '{}' added ({})", name, id),
            Message::CustomBreakUpdated(name) => format!("Custom break '{}' updated", name),
            Message::CustomBreakRemoved(name) => format!("Custom break '{}' removed", name),
            Message::CustomBreakAdjusted(name, interval, duration) => format!(
                "Values for '{}' were adjusted to the allowed range: every {}, lasting {}",
                name,
                format_seconds(*interval),
                format_seconds(*duration)
            ),
            Message::CustomBreakNotFound(query) => format!("No custom break matches '{}'", query),
            Message::CustomBreakAmbiguous(query) => format!("More than one custom break matches '{}'", query),
            Message::NoCustomBreaks => "No custom breaks defined".to_string(),

            // === ENGINE MESSAGES ===
            Message::BreaksDisabledNoTimers => "Breaks are disabled, no timers running".to_string(),
            Message::TimerScheduled(key, at) => format!("Timer {} scheduled for {}", key, format_time(*at)),
            Message::TimerCancelled(key) => format!("Timer {} cancelled", key),
            Message::StaleCustomTimer(id) => format!("Custom break {} no longer exists, timer dropped", id),
            Message::TriggerDropped(tag) => format!("A break is already on screen, {} trigger dropped", tag),
            Message::BreakStarted(title, duration) => format!("Break started: {} ({})", title, format_seconds(*duration)),
            Message::BreakSkipped(title) => format!("Break skipped: {}", title),
            Message::BreakFinished(title) => format!("Break finished: {}", title),
            Message::BreakCancelled(title) => format!("Break cancelled: {}", title),
            Message::SessionAlreadyFinished(session) => format!("Break session {} already finished", session),
            Message::BreakBanner(icon, title, duration) => format!("{}  {}  ({}, press Enter to skip)", icon, title, duration),
            Message::BreakOverlayClosed => "Back to work".to_string(),
            Message::NoActiveBreak => "No break on screen to skip".to_string(),

            // === CONTROL MESSAGES ===
            Message::ControlRequestQueued(request) => format!("Sent '{}' to the break scheduler", request),
            Message::ControlRequestReceived(request) => format!("Received request: {}", request),
            Message::ControlRequestIgnored(line) => format!("Ignored unreadable request: {}", line),
            Message::ControlRequestsFailed(error) => format!("Failed to read queued requests: {}", error),

            // === DAEMON MESSAGES ===
            Message::AlreadyRunning(pid) => format!("Lumin is already running (PID: {})", pid),
            Message::InstanceAcquired(pid) => format!("Instance lock taken by PID {}", pid),
            Message::ForegroundStarted => "Break scheduler running. Press Ctrl+C to stop.".to_string(),
            Message::DaemonStarted(pid) => format!("Break scheduler started in the background (PID: {})", pid),
            Message::DaemonStopped(pid) => format!("Break scheduler stopped (PID: {})", pid),
            Message::DaemonRunning(pid) => format!("Break scheduler is running (PID: {})", pid),
            Message::DaemonNotRunning => "Break scheduler is not running".to_string(),
            Message::DaemonModeNotSupported => "Background mode is not supported on this platform".to_string(),
            Message::FailedToGetCurrentExecutable(error) => format!("Failed to locate the lumin executable: {}", error),
            Message::FailedToTerminateProcess(error) => format!("Failed to stop the break scheduler: {}", error),
            Message::ProcessTerminationNotSupported => "Stopping processes is not supported on this platform".to_string(),
            Message::SchedulerStopped => "Break scheduler stopped".to_string(),
            Message::SchedulerError(error) => format!("Break scheduler failed: {}", error),
            Message::SchedulerPanicked(error) => format!("Break scheduler task panicked: {}", error),
            Message::SignalHandlerFailed(error) => format!("Failed to install signal handler: {}", error),
            Message::SignalHandlingNotSupported => "Signal handling is not supported on this platform".to_string(),
            Message::ReceivedSigterm => "Received SIGTERM, shutting down".to_string(),
            Message::ReceivedSigint => "Received SIGINT, shutting down".to_string(),
            Message::ReceivedCtrlC => "Received Ctrl+C, shutting down".to_string(),

            // === STATISTICS MESSAGES ===
            Message::StatisticsWriteFailed(error) => format!("Failed to record break: {}", error),
            Message::StatsHeader(days) => format!("Breaks over the last {} day(s)", days),
            Message::StatsAllTimeCompleted(tag, count) => format!("{} breaks taken (all time): {}", capitalize(tag), count),
            Message::StatsCompletionRate(rate) => format!("Completion rate (all time): {:.1}%", rate),
            Message::StatsMostActiveDay(date, count) => {
                format!("Most active day: {} with {} break(s) taken", date.format("%Y-%m-%d"), count)
            }
            Message::StatsNoActivity => "No breaks taken in the last 30 days".to_string(),
            Message::StatsReset(count) => format!("Deleted {} recorded break(s)", count),
            Message::ConfirmStatsReset => "Delete all recorded breaks?".to_string(),
            Message::TodaySummary(completed, total) => format!("Today: {} of {} break(s) taken", completed, total),
            Message::OperationCancelled => "Operation cancelled".to_string(),

            // === EXPORT MESSAGES ===
            Message::ExportingEvents(from, to) => {
                format!("Exporting breaks from {} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
            Message::ExportCompleted(count, path) => format!("Exported {} break(s) to {}", count, path),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("✗ Migration v{} failed: {}", version, error),
        };

        write!(f, "{}", text)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
