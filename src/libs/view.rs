use super::breaks::{BreakCategory, CustomBreak};
use super::config::Config;
use super::formatter::{format_seconds, format_time};
use super::statistics::DailyStatistics;
use chrono::NaiveDateTime;
use prettytable::{row, Table};

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub struct View {}

impl View {
    /// Category schedules, with the next fire when the daemon reported one.
    pub fn schedule(config: &Config, next_fires: &[(BreakCategory, Option<NaiveDateTime>)]) {
        let mut table = Table::new();

        table.add_row(row!["CATEGORY", "INTERVAL", "DURATION", "ENABLED", "NEXT"]);
        for category in BreakCategory::SCHEDULED {
            let Some(schedule) = config.schedule(category) else {
                continue;
            };
            let next = next_fires
                .iter()
                .find(|(c, _)| *c == category)
                .and_then(|(_, at)| *at)
                .map(format_time)
                .unwrap_or_else(|| "-".to_string());

            table.add_row(row![
                category,
                format_seconds(schedule.interval),
                format_seconds(schedule.duration),
                on_off(schedule.enabled),
                next
            ]);
        }
        table.add_row(row!["custom", "-", "-", on_off(config.custom_breaks_enabled), "-"]);
        table.printstd();
    }

    pub fn custom_breaks(custom_breaks: &[CustomBreak]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "ICON", "INTERVAL", "DURATION", "ENABLED"]);
        for definition in custom_breaks {
            table.add_row(row![
                definition.id,
                definition.name,
                definition.display_icon(),
                format_seconds(definition.interval),
                format_seconds(definition.duration),
                on_off(definition.enabled)
            ]);
        }
        table.printstd();
    }

    /// One row per day, oldest first, plus a totals row.
    pub fn statistics(days: &[DailyStatistics]) {
        let mut table = Table::new();

        table.add_row(row!["DATE", "TOTAL", "TAKEN", "SKIPPED", "REGULAR", "MICRO", "WATER", "CUSTOM", "TIME", "RATE"]);
        for day in days {
            let custom: usize = day.custom.values().sum();
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                day.total,
                day.completed,
                day.skipped(),
                day.regular,
                day.micro,
                day.water,
                custom,
                format_seconds(day.total_time),
                format!("{:.0}%", day.completion_rate())
            ]);
        }

        let total: usize = days.iter().map(|day| day.total).sum();
        let completed: usize = days.iter().map(|day| day.completed).sum();
        let time: u64 = days.iter().map(|day| day.total_time).sum();
        let rate = if total == 0 { 0.0 } else { completed as f64 / total as f64 * 100.0 };
        table.add_row(row![
            "TOTAL",
            total,
            completed,
            total - completed,
            "",
            "",
            "",
            "",
            format_seconds(time),
            format!("{:.0}%", rate)
        ]);
        table.printstd();
    }

    /// Completed breaks per custom break name over the listed days.
    pub fn custom_statistics(days: &[DailyStatistics]) {
        let mut totals = std::collections::BTreeMap::<&str, usize>::new();
        for day in days {
            for (name, count) in &day.custom {
                *totals.entry(name.as_str()).or_default() += count;
            }
        }
        if totals.is_empty() {
            return;
        }

        let mut table = Table::new();
        table.add_row(row!["CUSTOM BREAK", "TAKEN"]);
        for (name, count) in totals {
            table.add_row(row![name, count]);
        }
        table.printstd();
    }
}
