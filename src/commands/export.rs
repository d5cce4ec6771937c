use crate::{
    db::break_events::BreakEvents,
    libs::{
        export::{ExportFormat, Exporter},
        messages::Message,
    },
    msg_info,
};
use anyhow::Result;
use chrono::{Duration, Local};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of days to export, ending today
    #[arg(short, long, default_value_t = 30)]
    days: u32,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let to = Local::now().date_naive();
    let from = to - Duration::days(i64::from(args.days.max(1)) - 1);

    msg_info!(Message::ExportingEvents(from, to));

    let exporter = Exporter::new(args.format, args.output);
    exporter.export_range(&BreakEvents::new()?, from, to)?;
    Ok(())
}
