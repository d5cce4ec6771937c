//! Requests from the CLI to the running scheduler.
//!
//! The CLI appends one JSON value per line to `lumin.requests` in the data
//! directory. On each settings poll the scheduler takes the whole file and
//! runs the requests in order. Taking renames the file before reading it, so
//! a request appended meanwhile lands in a fresh file and waits for the next
//! poll instead of being lost.

use crate::libs::data_storage::DataStorage;
use crate::libs::engine::EngineCommand;
use crate::libs::messages::Message;
use crate::msg_warning;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};

pub const REQUESTS_FILE_NAME: &str = "lumin.requests";
const TAKEN_FILE_NAME: &str = "lumin.requests.taken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlRequest {
    StartBreakNow,
    SkipNextBreak,
    SkipActiveBreak,
    ToggleEnabled,
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ControlRequest::StartBreakNow => "start a break now",
            ControlRequest::SkipNextBreak => "skip the next break",
            ControlRequest::SkipActiveBreak => "skip the current break",
            ControlRequest::ToggleEnabled => "toggle breaks",
        };
        write!(f, "{}", text)
    }
}

impl From<ControlRequest> for EngineCommand {
    fn from(request: ControlRequest) -> Self {
        match request {
            ControlRequest::StartBreakNow => EngineCommand::StartBreakNow,
            ControlRequest::SkipNextBreak => EngineCommand::SkipNextBreak,
            ControlRequest::SkipActiveBreak => EngineCommand::SkipActiveBreak,
            ControlRequest::ToggleEnabled => EngineCommand::ToggleEnabled,
        }
    }
}

/// Queues `request` for the scheduler reading `storage`.
pub fn send_request(storage: &DataStorage, request: ControlRequest) -> Result<()> {
    let mut line = serde_json::to_string(&request)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(storage.get_path(REQUESTS_FILE_NAME)?)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Removes and returns every queued request, oldest first.
///
/// Lines that do not decode are dropped with a warning.
pub fn take_requests(storage: &DataStorage) -> Result<Vec<ControlRequest>> {
    let queued = storage.get_path(REQUESTS_FILE_NAME)?;
    let taken = storage.get_path(TAKEN_FILE_NAME)?;

    match fs::rename(&queued, &taken) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    }
    let contents = fs::read_to_string(&taken);
    let _ = fs::remove_file(&taken);

    let requests = contents?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(request) => Some(request),
            Err(_) => {
                msg_warning!(Message::ControlRequestIgnored(line.to_string()));
                None
            }
        })
        .collect();
    Ok(requests)
}
