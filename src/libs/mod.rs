//! Core library modules.
//!
//! - **Scheduling**: [`engine`], [`timer`], [`clock`], [`scheduler`]
//! - **Breaks and settings**: [`breaks`], [`config`], [`settings`]
//! - **Collaborators**: [`overlay`], [`statistics`]
//! - **Process**: [`daemon`], [`instance`], [`control`], [`autostart`]
//! - **Output**: [`messages`], [`formatter`], [`view`], [`export`]

pub mod autostart;
pub mod breaks;
pub mod clock;
pub mod config;
pub mod control;
pub mod daemon;
pub mod data_storage;
pub mod engine;
pub mod export;
pub mod formatter;
pub mod instance;
pub mod messages;
pub mod overlay;
pub mod scheduler;
pub mod settings;
pub mod statistics;
pub mod timer;
pub mod view;
