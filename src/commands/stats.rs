use crate::{
    db::break_events::BreakEvents,
    libs::{breaks::BreakTag, messages::Message, view::View},
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    command: Option<StatsCommand>,

    /// Number of days to show, ending today
    #[arg(short, long, default_value_t = 7)]
    days: u32,
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    /// Delete every recorded break
    Reset {
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(args: StatsArgs) -> Result<()> {
    let events = BreakEvents::new()?;

    match args.command {
        Some(StatsCommand::Reset { yes }) => {
            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::ConfirmStatsReset.to_string())
                    .default(false)
                    .interact()?;
            if !confirmed {
                msg_info!(Message::OperationCancelled);
                return Ok(());
            }

            let deleted = events.reset()?;
            msg_success!(Message::StatsReset(deleted));
            Ok(())
        }
        None => show(&events, args.days.max(1)),
    }
}

fn show(events: &BreakEvents, days: u32) -> Result<()> {
    let today = Local::now().date_naive();
    let statistics = events.range_statistics(today, days)?;

    msg_print!(Message::StatsHeader(days), true);
    View::statistics(&statistics);
    View::custom_statistics(&statistics);

    let totals = [BreakTag::Regular, BreakTag::Micro, BreakTag::Water]
        .iter()
        .map(|tag| Ok((tag.to_string(), events.total_completed(tag)?)))
        .collect::<Result<Vec<_>>>()?;
    for (tag, count) in totals {
        msg_print!(Message::StatsAllTimeCompleted(tag, count));
    }
    msg_print!(Message::StatsCompletionRate(events.completion_rate()?));

    match events.most_active_day(today)? {
        Some((date, count)) => msg_print!(Message::StatsMostActiveDay(date, count)),
        None => msg_print!(Message::StatsNoActivity),
    }
    Ok(())
}
