//! Database layer.
//!
//! A single SQLite file, `lumin.db`, in the data directory. Opening a [`db::Db`]
//! applies any pending migrations before the connection is handed out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lumin::db::break_events::BreakEvents;
//! use chrono::Local;
//!
//! let events = BreakEvents::new()?;
//! let today = events.daily_statistics(Local::now().date_naive())?;
//! println!("{} of {} breaks taken", today.completed, today.total);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection setup.
pub mod db;

/// Versioned schema changes, recorded in the `migrations` table.
pub mod migrations;

/// Taken and skipped breaks, and the aggregates built from them.
pub mod break_events;
