//! Command-line interface.
//!
//! One module per subcommand. Commands that change settings write the
//! settings files; a running daemon notices the change and applies it to its
//! engine, restarting only the timers concerned. `break`, `skip` and
//! `toggle` queue a request that the daemon picks up on its next poll.

pub mod autostart;
pub mod config;
pub mod control;
pub mod custom;
pub mod export;
pub mod init;
pub mod run;
pub mod start;
pub mod stats;
pub mod status;
pub mod stop;

use crate::libs::control::ControlRequest;
use crate::libs::daemon::{self, RunMode};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the break scheduler in this terminal (Enter skips a break)")]
    Run,
    #[command(about = "Start the break scheduler in the background")]
    Start,
    #[command(about = "Stop the background break scheduler")]
    Stop,
    #[command(about = "Show scheduler state and the configured schedule")]
    Status,
    #[command(about = "Start a regular break now")]
    Break,
    #[command(about = "Postpone the next regular break by a full interval")]
    Skip(control::SkipArgs),
    #[command(about = "Turn all breaks off or back on")]
    Toggle,
    #[command(about = "Interactive configuration")]
    Init(init::InitArgs),
    #[command(about = "Show or change the break schedule", arg_required_else_help = true)]
    Config(config::ConfigArgs),
    #[command(about = "Manage custom breaks", arg_required_else_help = true)]
    Custom(custom::CustomArgs),
    #[command(about = "Break statistics")]
    Stats(stats::StatsArgs),
    #[command(about = "Export recorded breaks")]
    Export(export::ExportArgs),
    #[command(about = "Start at login", arg_required_else_help = true)]
    Autostart(autostart::AutostartArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Runs the headless scheduler; used by `start`.
    #[arg(long, hide = true, global = true)]
    daemon_run: bool,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();

        if cli.daemon_run {
            return daemon::run_with_signal_handling(RunMode::Daemon).await;
        }

        match cli.command {
            Some(Commands::Run) => run::cmd().await,
            Some(Commands::Start) => start::cmd(),
            Some(Commands::Stop) => stop::cmd(),
            Some(Commands::Status) => status::cmd(),
            Some(Commands::Break) => control::cmd(ControlRequest::StartBreakNow),
            Some(Commands::Skip(args)) => control::cmd(args.request()),
            Some(Commands::Toggle) => control::cmd(ControlRequest::ToggleEnabled),
            Some(Commands::Init(args)) => init::cmd(args),
            Some(Commands::Config(args)) => config::cmd(args),
            Some(Commands::Custom(args)) => custom::cmd(args),
            Some(Commands::Stats(args)) => stats::cmd(args),
            Some(Commands::Export(args)) => export::cmd(args),
            Some(Commands::Autostart(args)) => autostart::cmd(args),
            None => {
                Self::command().print_help()?;
                Ok(())
            }
        }
    }
}
