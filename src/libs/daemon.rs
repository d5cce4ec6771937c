//! Engine process lifecycle: foreground runs, the background daemon, and
//! shutdown on signals.
//!
//! `lumin start` re-launches the current executable with the hidden
//! `--daemon-run` flag, detached from the terminal. The child, and only the
//! child, takes the instance PID file and runs the engine headless until it receives SIGTERM
//! or SIGINT (Ctrl-C on Windows). `lumin stop` signals the PID recorded in
//! that file.

use crate::libs::breaks::BreakCategory;
use crate::libs::clock::{to_local, Clock, SystemClock};
use crate::libs::data_storage::DataStorage;
use crate::libs::engine::ScheduleEngine;
use crate::libs::instance::{pid_file_path, read_pid, running_instance, InstanceError, InstanceGuard};
use crate::libs::messages::Message;
use crate::libs::overlay::{LogOverlay, OverlayPresenter, TerminalOverlay};
use crate::libs::scheduler::{Scheduler, SettingsWatcher};
use crate::libs::settings::SettingsStore;
use crate::libs::statistics::SqliteRecorder;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info, msg_warning};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

#[cfg(any(unix, windows))]
const CLAIM_WAIT_STEPS: usize = 20;
#[cfg(any(unix, windows))]
const CLAIM_WAIT_STEP: Duration = Duration::from_millis(100);

/// How the engine shows breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Attached to a terminal; Enter skips the current break.
    Foreground,
    /// Detached background process; breaks are only logged.
    Daemon,
}

/// Resolves on SIGTERM or SIGINT (Ctrl-C elsewhere).
fn spawn_signal_listener() -> oneshot::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    msg_error!(Message::SignalHandlerFailed(e.to_string()));
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => msg_info!(Message::ReceivedSigterm),
                _ = sigint.recv() => msg_info!(Message::ReceivedSigint),
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => msg_info!(Message::ReceivedCtrlC),
                Err(e) => msg_error!(Message::SignalHandlerFailed(e.to_string())),
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(not(any(unix, windows)))]
    {
        msg_warning!(Message::SignalHandlingNotSupported);
        std::mem::forget(shutdown_tx);
    }

    shutdown_rx
}

/// Runs the engine in this process until a shutdown signal arrives.
///
/// Exits quietly when another instance already holds the PID file.
pub async fn run_with_signal_handling(mode: RunMode) -> Result<()> {
    let _guard = match InstanceGuard::acquire() {
        Ok(guard) => guard,
        Err(InstanceError::AlreadyRunning(pid)) => {
            msg_info!(Message::AlreadyRunning(pid));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let storage = DataStorage::new();
    let settings = SettingsStore::open_background(storage.clone());
    let statistics = SqliteRecorder::new()?;
    let presenter: Box<dyn OverlayPresenter> = match mode {
        RunMode::Foreground => Box::new(TerminalOverlay::new()),
        RunMode::Daemon => Box::new(LogOverlay),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (sender, receiver) = mpsc::unbounded_channel();

    let mut engine = ScheduleEngine::new(settings, Box::new(statistics), presenter, Arc::clone(&clock), sender);

    if mode == RunMode::Foreground {
        engine.start_all_timers();
        let next_fires: Vec<_> = BreakCategory::SCHEDULED
            .into_iter()
            .map(|category| (category, engine.next_fire(category).map(to_local)))
            .collect();
        View::schedule(engine.settings().config(), &next_fires);
        msg_info!(Message::ForegroundStarted);
    }

    let scheduler = Scheduler::new(engine, receiver, clock).with_watcher(SettingsWatcher::new(storage));

    let shutdown = spawn_signal_listener();
    let handle = tokio::spawn(scheduler.run(shutdown));

    match handle.await {
        Ok(Ok(_engine)) => msg_info!(Message::SchedulerStopped),
        Ok(Err(e)) => msg_error!(Message::SchedulerError(e.to_string())),
        Err(e) => msg_error!(Message::SchedulerPanicked(e.to_string())),
    }

    Ok(())
}

/// Starts the background daemon unless an instance is already live.
pub fn spawn() -> Result<()> {
    let pid_path = pid_file_path()?;
    if let Some(pid) = running_instance(&pid_path) {
        msg_info!(Message::AlreadyRunning(pid));
        return Ok(());
    }

    let current_exe = std::env::current_exe().map_err(|e| msg_error_anyhow!(Message::FailedToGetCurrentExecutable(e.to_string())))?;

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let mut command = std::process::Command::new(current_exe);
        command.arg("--daemon-run");
        // Detach from the terminal's session so closing it does not stop the daemon
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
        let child = command.spawn()?;
        msg_info!(Message::DaemonStarted(await_claim(&pid_path, child.id())));
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        let child = std::process::Command::new(current_exe)
            .arg("--daemon-run")
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;
        msg_info!(Message::DaemonStarted(await_claim(&pid_path, child.id())));
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (current_exe, pid_path);
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    Ok(())
}

/// Waits for the spawned child to write the PID file and returns the PID it
/// holds. An instance that won a concurrent start shows up here too. Falls
/// back to `child` when nothing claims the file in time.
#[cfg(any(unix, windows))]
pub fn await_claim(pid_path: &Path, child: u32) -> u32 {
    for _ in 0..CLAIM_WAIT_STEPS {
        if let Some(pid) = running_instance(pid_path) {
            return pid;
        }
        std::thread::sleep(CLAIM_WAIT_STEP);
    }
    child
}

/// Stops the background daemon. Not running is not an error.
pub fn stop() -> Result<()> {
    let pid_path = pid_file_path()?;
    let Some(pid) = read_pid(&pid_path) else {
        msg_info!(Message::DaemonNotRunning);
        return Ok(());
    };

    let stopped = kill_process(pid)?;
    // The daemon removes its own file on a clean exit
    let _ = std::fs::remove_file(&pid_path);

    if stopped {
        msg_info!(Message::DaemonStopped(pid));
    } else {
        msg_warning!(Message::DaemonNotRunning);
    }
    Ok(())
}

/// PID of the running daemon, if any.
pub fn status() -> Result<Option<u32>> {
    Ok(running_instance(&pid_file_path()?))
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use crate::libs::instance::is_process_alive;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if !is_process_alive(pid) {
        return Ok(false);
    }
    let target = Pid::from_raw(pid as i32);

    kill(target, Signal::SIGTERM).map_err(|e| msg_error_anyhow!(Message::FailedToTerminateProcess(e.to_string())))?;

    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(100));
        if !is_process_alive(pid) {
            return Ok(true);
        }
    }

    kill(target, Signal::SIGKILL).map_err(|e| msg_error_anyhow!(Message::FailedToTerminateProcess(e.to_string())))?;
    std::thread::sleep(Duration::from_millis(100));
    Ok(true)
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            if error == 87 {
                // ERROR_INVALID_PARAMETER: no such process
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToTerminateProcess(format!("OpenProcess error {}", error)));
        }

        let result = TerminateProcess(handle, 0);
        CloseHandle(handle);

        if result == 0 {
            let error = GetLastError();
            msg_bail_anyhow!(Message::FailedToTerminateProcess(format!("TerminateProcess error {}", error)));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(true)
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}
