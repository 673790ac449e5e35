//! Default mode: the full-screen UI.

use anyhow::Result;
use cafe_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    cafe_tui::run_interactive(config).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!("This build has no interactive UI. Use `cafe sessions --help`.")
}
