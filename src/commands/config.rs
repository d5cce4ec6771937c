use crate::{
    libs::{breaks::BreakCategory, messages::Message, settings::SettingsStore, view::View},
    msg_bail_anyhow, msg_error_anyhow, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the current schedule
    Show,
    /// Change the interval and/or duration of a category
    Set {
        #[arg(value_enum)]
        category: BreakCategory,
        /// Seconds between breaks
        #[arg(short, long)]
        interval: Option<u64>,
        /// Break length in seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },
    Enable {
        #[arg(value_enum)]
        target: ConfigTarget,
    },
    Disable {
        #[arg(value_enum)]
        target: ConfigTarget,
    },
}

/// What `enable`/`disable` switch: the master toggle, one category, or all custom breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigTarget {
    All,
    Regular,
    Micro,
    Water,
    Custom,
}

impl ConfigTarget {
    fn category(self) -> Option<BreakCategory> {
        match self {
            ConfigTarget::Regular => Some(BreakCategory::Regular),
            ConfigTarget::Micro => Some(BreakCategory::Micro),
            ConfigTarget::Water => Some(BreakCategory::Water),
            ConfigTarget::All | ConfigTarget::Custom => None,
        }
    }
}

pub fn cmd(args: ConfigArgs) -> Result<()> {
    let mut settings = SettingsStore::load();

    match args.command {
        ConfigCommand::Show => {
            msg_print!(Message::BreaksState(settings.is_enabled()));
            View::schedule(settings.config(), &[]);
            Ok(())
        }
        ConfigCommand::Set {
            category,
            interval,
            duration,
        } => {
            if interval.is_none() && duration.is_none() {
                msg_bail_anyhow!(Message::ConfigNothingToSet);
            }
            let Some(current) = settings.schedule(category) else {
                msg_bail_anyhow!(Message::CategoryNotSchedulable(category));
            };

            settings
                .set_schedule(category, interval.unwrap_or(current.interval), duration.unwrap_or(current.duration))
                .map_err(|e| msg_error_anyhow!(Message::SettingsRejected(e.to_string())))?;

            msg_success!(Message::ScheduleUpdated(category));
            Ok(())
        }
        ConfigCommand::Enable { target } => set_target(&mut settings, target, true),
        ConfigCommand::Disable { target } => set_target(&mut settings, target, false),
    }
}

fn set_target(settings: &mut SettingsStore, target: ConfigTarget, enabled: bool) -> Result<()> {
    match (target, target.category()) {
        (_, Some(category)) => {
            settings
                .set_category_enabled(category, enabled)
                .map_err(|e| msg_error_anyhow!(Message::SettingsRejected(e.to_string())))?;
            msg_success!(Message::CategoryToggled(category, enabled));
        }
        (ConfigTarget::Custom, None) => {
            settings.set_custom_breaks_enabled(enabled);
            msg_success!(Message::CustomBreaksToggled(enabled));
        }
        (_, None) => {
            settings.set_enabled(enabled);
            msg_success!(Message::BreaksToggled(enabled));
        }
    }
    Ok(())
}
