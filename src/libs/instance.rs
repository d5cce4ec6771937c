//! Single-instance enforcement.
//!
//! Exactly one engine may run per user. The running instance owns a PID file
//! in the data directory; a second process finding a live PID there defers to
//! it and exits. Stale files left by a crashed instance are taken over.
//!
//! The file is created with `create_new`, so of two processes starting at
//! once exactly one wins. Only the engine process itself writes it; `start`
//! waits for the child to claim it.

use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_debug;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use thiserror::Error;

pub const PID_FILE_NAME: &str = "lumin.pid";

/// Attempts at claiming the PID file before giving up.
const CLAIM_ATTEMPTS: usize = 4;
/// Pause when the file exists but holds no PID yet.
const CLAIM_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("another instance is already running (PID {0})")]
    AlreadyRunning(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn is_process_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}

/// PID recorded in `path`, if the file exists and parses.
pub fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// PID of a live instance other than this process, if any.
pub fn running_instance(path: &Path) -> Option<u32> {
    read_pid(path).filter(|pid| *pid != std::process::id() && is_process_alive(*pid))
}

pub fn pid_file_path() -> anyhow::Result<PathBuf> {
    DataStorage::new().get_path(PID_FILE_NAME)
}

/// Ownership of the PID file; the file is removed on drop.
#[derive(Debug)]
pub struct InstanceGuard {
    path: PathBuf,
    pid: u32,
}

impl InstanceGuard {
    pub fn acquire() -> Result<Self, InstanceError> {
        Self::acquire_at(DataStorage::new().get_path(PID_FILE_NAME)?)
    }

    /// Claims the PID file at `path`.
    ///
    /// A file naming a live process other than this one means
    /// [`InstanceError::AlreadyRunning`]. A file naming this process is kept
    /// as is. Anything else is stale and replaced.
    pub fn acquire_at(path: impl Into<PathBuf>) -> Result<Self, InstanceError> {
        let path = path.into();
        let pid = std::process::id();

        for attempt in 0..CLAIM_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(pid.to_string().as_bytes())?;
                    msg_debug!(Message::InstanceAcquired(pid));
                    return Ok(Self { path, pid });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => match read_pid(&path) {
                    Some(owner) if owner == pid => return Ok(Self { path, pid }),
                    Some(owner) if is_process_alive(owner) => return Err(InstanceError::AlreadyRunning(owner)),
                    Some(dead) => {
                        if read_pid(&path) == Some(dead) {
                            let _ = fs::remove_file(&path);
                        }
                    }
                    // Possibly still being written by a process that just created it
                    None if attempt + 2 < CLAIM_ATTEMPTS => std::thread::sleep(CLAIM_RETRY_DELAY),
                    None => {
                        let _ = fs::remove_file(&path);
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }

        match read_pid(&path) {
            Some(owner) => Err(InstanceError::AlreadyRunning(owner)),
            None => Err(InstanceError::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                "PID file keeps changing",
            ))),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // Leave the file alone if another instance took it over
        if read_pid(&self.path) == Some(self.pid) {
            let _ = fs::remove_file(&self.path);
        }
    }
}
