use crate::{
    libs::{
        breaks::{normalize_custom_break, CustomBreak, DEFAULT_CUSTOM_ICON},
        config::try_read_custom_breaks_from,
        data_storage::DataStorage,
        messages::Message,
        settings::SettingsStore,
        view::View,
    },
    msg_bail_anyhow, msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct CustomArgs {
    #[command(subcommand)]
    command: CustomCommand,
}

#[derive(Debug, Subcommand)]
enum CustomCommand {
    List,
    Add {
        #[arg(short, long)]
        name: String,
        /// Seconds between breaks (60-43200)
        #[arg(short, long)]
        interval: u64,
        /// Break length in seconds (1-3600)
        #[arg(short, long)]
        duration: u64,
        #[arg(long, default_value = DEFAULT_CUSTOM_ICON)]
        icon: String,
        /// Store the break without scheduling it
        #[arg(long)]
        disabled: bool,
    },
    Update {
        /// Id or unique id prefix
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        interval: Option<u64>,
        #[arg(short, long)]
        duration: Option<u64>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
    },
    Remove {
        /// Id or unique id prefix
        id: String,
    },
}

pub fn cmd(args: CustomArgs) -> Result<()> {
    let storage = DataStorage::new();
    if !matches!(args.command, CustomCommand::List) {
        ensure_readable(&storage)?;
    }
    let mut settings = SettingsStore::open(storage);

    match args.command {
        CustomCommand::List => {
            if settings.custom_breaks().is_empty() {
                msg_info!(Message::NoCustomBreaks);
            } else {
                View::custom_breaks(settings.custom_breaks());
            }
            Ok(())
        }
        CustomCommand::Add {
            name,
            interval,
            duration,
            icon,
            disabled,
        } => {
            let mut definition = CustomBreak::new(name, icon, interval, duration);
            definition.enabled = !disabled;
            let (definition, adjusted) = normalize_custom_break(definition);
            notify_adjusted(&definition, adjusted);

            let mut definitions = settings.custom_breaks().to_vec();
            msg_success!(Message::CustomBreakAdded(definition.name.clone(), definition.id.to_string()));
            definitions.push(definition);
            settings.set_custom_breaks(definitions);
            Ok(())
        }
        CustomCommand::Update {
            id,
            name,
            interval,
            duration,
            icon,
            enabled,
        } => {
            let mut definitions = settings.custom_breaks().to_vec();
            let index = find_custom_break(&definitions, &id)?;

            let mut definition = definitions[index].clone();
            if let Some(name) = name {
                definition.name = name;
            }
            if let Some(interval) = interval {
                definition.interval = interval;
            }
            if let Some(duration) = duration {
                definition.duration = duration;
            }
            if let Some(icon) = icon {
                definition.icon = icon;
            }
            if let Some(enabled) = enabled {
                definition.enabled = enabled;
            }

            let (definition, adjusted) = normalize_custom_break(definition);
            notify_adjusted(&definition, adjusted);
            msg_success!(Message::CustomBreakUpdated(definition.name.clone()));
            definitions[index] = definition;
            settings.set_custom_breaks(definitions);
            Ok(())
        }
        CustomCommand::Remove { id } => {
            let mut definitions = settings.custom_breaks().to_vec();
            let index = find_custom_break(&definitions, &id)?;
            let removed = definitions.remove(index);
            settings.set_custom_breaks(definitions);

            msg_success!(Message::CustomBreakRemoved(removed.name));
            Ok(())
        }
    }
}

/// Index of the definition whose id equals `query` or starts with it.
///
/// A prefix matching more than one definition is an error.
pub fn find_custom_break(definitions: &[CustomBreak], query: &str) -> Result<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        msg_bail_anyhow!(Message::CustomBreakNotFound(query));
    }

    if let Some(index) = definitions.iter().position(|definition| definition.id.to_string() == query) {
        return Ok(index);
    }

    let matches: Vec<usize> = definitions
        .iter()
        .enumerate()
        .filter(|(_, definition)| definition.id.to_string().starts_with(&query))
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => msg_bail_anyhow!(Message::CustomBreakNotFound(query)),
        _ => msg_bail_anyhow!(Message::CustomBreakAmbiguous(query)),
    }
}

/// Fails when the custom breaks file exists but does not decode, so an edit
/// never replaces it with a list missing the unreadable entries.
pub fn ensure_readable(storage: &DataStorage) -> Result<()> {
    if let Err(e) = try_read_custom_breaks_from(storage) {
        msg_bail_anyhow!(Message::CustomBreaksUnreadable(e.to_string()));
    }
    Ok(())
}

fn notify_adjusted(definition: &CustomBreak, adjusted: bool) {
    if adjusted {
        msg_warning!(Message::CustomBreakAdjusted(
            definition.name.clone(),
            definition.interval,
            definition.duration
        ));
    }
}
