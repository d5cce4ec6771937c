use crate::libs::breaks::BreakCategory;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone)]
pub enum Message {
    // === AUTOSTART MESSAGES ===
    AutostartEnabled,
    AutostartDisabled,
    AutostartAlreadyDisabled,
    AutostartEnableFailed(String),
    AutostartDisableFailed(String),
    AutostartStatus(String),
    AutostartStatusFailed(String),
    HomeDirectoryNotFound,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigLoadFailed(String),
    ConfigSection(BreakCategory),
    ConfigNothingToSet,
    CategoryNotSchedulable(BreakCategory),
    SettingsPersistFailed(String),
    SettingsRejected(String),
    SettingsReloaded,
    ScheduleUpdated(BreakCategory),
    BreaksState(bool),
    BreaksToggled(bool),
    CategoryToggled(BreakCategory, bool),
    CustomBreaksToggled(bool),
    PromptBreaksEnabled,
    PromptCategoryEnabled(BreakCategory),
    PromptInterval(BreakCategory),
    PromptDuration(BreakCategory),
    PromptCustomBreaksEnabled,

    // === CUSTOM BREAK MESSAGES ===
    CustomBreaksLoadFailed(String),
    CustomBreaksKept(String),
    CustomBreaksUnreadable(String),
    CustomBreakAdded(String, String), // name, id
    CustomBreakUpdated(String),
    CustomBreakRemoved(String),
    CustomBreakAdjusted(String, u64, u64), // name, interval, duration
    CustomBreakNotFound(String),
    CustomBreakAmbiguous(String),
    NoCustomBreaks,

    // === ENGINE MESSAGES ===
    BreaksDisabledNoTimers,
    TimerScheduled(String, NaiveDateTime),
    TimerCancelled(String),
    StaleCustomTimer(String),
    TriggerDropped(String),
    BreakStarted(String, u64),
    BreakSkipped(String),
    BreakFinished(String),
    BreakCancelled(String),
    SessionAlreadyFinished(u64),
    BreakBanner(String, String, String), // icon, title, duration
    BreakOverlayClosed,
    NoActiveBreak,

    // === CONTROL MESSAGES ===
    ControlRequestQueued(String),
    ControlRequestReceived(String),
    ControlRequestIgnored(String),
    ControlRequestsFailed(String),

    // === DAEMON MESSAGES ===
    AlreadyRunning(u32),
    InstanceAcquired(u32),
    ForegroundStarted,
    DaemonStarted(u32),
    DaemonStopped(u32),
    DaemonRunning(u32),
    DaemonNotRunning,
    DaemonModeNotSupported,
    FailedToGetCurrentExecutable(String),
    FailedToTerminateProcess(String),
    ProcessTerminationNotSupported,
    SchedulerStopped,
    SchedulerError(String),
    SchedulerPanicked(String),
    SignalHandlerFailed(String),
    SignalHandlingNotSupported,
    ReceivedSigterm,
    ReceivedSigint,
    ReceivedCtrlC,

    // === STATISTICS MESSAGES ===
    StatisticsWriteFailed(String),
    StatsHeader(u32),
    StatsAllTimeCompleted(String, usize),
    StatsCompletionRate(f64),
    StatsMostActiveDay(NaiveDate, usize),
    StatsNoActivity,
    StatsReset(usize),
    ConfirmStatsReset,
    TodaySummary(usize, usize), // completed, total
    OperationCancelled,

    // === EXPORT MESSAGES ===
    ExportingEvents(NaiveDate, NaiveDate),
    ExportCompleted(usize, String),

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
}
