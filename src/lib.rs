//! # Lumin - break reminders
//!
//! Interrupts a computer session with regular breaks, short micro breaks,
//! water breaks and user-defined custom breaks, each on its own repeating
//! schedule, with at most one break on screen at a time.
//!
//! ## Features
//!
//! - **Schedule engine**: independent timers per category and per custom
//!   break, selective restarts on settings changes
//! - **Daemon**: single background instance that picks up settings edits
//! - **Statistics**: taken and skipped breaks in SQLite, summaries and export
//! - **Login item**: optional start at login
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lumin::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
