use crate::libs::{autostart, messages::Message, settings::SettingsStore};
use crate::msg_print;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct AutostartArgs {
    #[command(subcommand)]
    command: AutostartCommand,
}

#[derive(Debug, Subcommand)]
enum AutostartCommand {
    /// Start lumin when you log in
    Enable,
    /// Stop starting lumin at login
    Disable,
    Status,
}

pub fn cmd(args: AutostartArgs) -> Result<()> {
    match args.command {
        AutostartCommand::Enable => {
            autostart::enable()?;
            SettingsStore::load().set_start_at_login(true);
            Ok(())
        }
        AutostartCommand::Disable => {
            autostart::disable()?;
            SettingsStore::load().set_start_at_login(false);
            Ok(())
        }
        AutostartCommand::Status => {
            let status = autostart::status()?;
            msg_print!(Message::AutostartStatus(status));
            Ok(())
        }
    }
}
