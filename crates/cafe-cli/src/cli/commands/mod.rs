//! CLI command handlers.

pub mod config;
pub mod sessions;
pub mod tui;
