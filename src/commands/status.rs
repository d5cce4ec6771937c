use crate::{
    db::break_events::BreakEvents,
    libs::{autostart, daemon, messages::Message, settings::SettingsStore, view::View},
    msg_info, msg_print, msg_warning,
};
use anyhow::Result;
use chrono::Local;

pub fn cmd() -> Result<()> {
    match daemon::status()? {
        Some(pid) => msg_info!(Message::DaemonRunning(pid)),
        None => msg_info!(Message::DaemonNotRunning),
    }

    let settings = SettingsStore::load();
    let config = settings.config();
    msg_print!(Message::BreaksState(config.enabled));
    View::schedule(config, &[]);

    if !settings.custom_breaks().is_empty() {
        View::custom_breaks(settings.custom_breaks());
    }

    match autostart::status() {
        Ok(status) => msg_print!(Message::AutostartStatus(status)),
        Err(e) => msg_warning!(Message::AutostartStatusFailed(e.to_string())),
    }

    let today = BreakEvents::new()?.daily_statistics(Local::now().date_naive())?;
    msg_print!(Message::TodaySummary(today.completed, today.total));
    Ok(())
}
