//! `break`, `skip` and `toggle`: actions carried out by the running scheduler.

use crate::libs::control::{send_request, ControlRequest};
use crate::libs::data_storage::DataStorage;
use crate::libs::instance::{pid_file_path, running_instance};
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SkipArgs {
    /// Skip the break on screen instead of postponing the next one
    #[arg(long)]
    pub current: bool,
}

impl SkipArgs {
    pub fn request(&self) -> ControlRequest {
        if self.current {
            ControlRequest::SkipActiveBreak
        } else {
            ControlRequest::SkipNextBreak
        }
    }
}

pub fn cmd(request: ControlRequest) -> Result<()> {
    if running_instance(&pid_file_path()?).is_none() {
        msg_info!(Message::DaemonNotRunning);
        return Ok(());
    }

    send_request(&DataStorage::new(), request)?;
    msg_success!(Message::ControlRequestQueued(request.to_string()));
    Ok(())
}
