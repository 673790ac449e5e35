//! Full-screen TUI for Code Cafe.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
use cafe_core::config::Config;
use cafe_core::notice::{ChannelNotifier, Notices};
use cafe_core::{DeleteController, IdentityGate, IdentityStatus, SessionStore, sync};
pub use features::{compose, notices, sessions};
pub use runtime::{Services, TuiRuntime};
use tokio::sync::mpsc;

/// Principal used when sign-in is toggled without a configured id.
const FALLBACK_PRINCIPAL: &str = "me";

/// Runs the interactive UI until the user quits.
pub async fn run_interactive(config: &Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The interactive UI requires a terminal.\n\
             Use `cafe sessions list` for non-interactive access."
        );
    }

    let principal_id = config
        .principal_id()
        .unwrap_or_else(|| FALLBACK_PRINCIPAL.to_string());
    let initial = if config.has_credentials() {
        IdentityStatus::signed_in(principal_id.clone())
    } else {
        tracing::info!("No credentials configured, starting signed out");
        IdentityStatus::signed_out()
    };
    let identity = Arc::new(IdentityGate::new(initial));

    let (notices_tx, notices_rx) = mpsc::unbounded_channel();
    let notices = Notices::new(Arc::new(ChannelNotifier::new(notices_tx)));
    let backend = sync::from_config(config, &principal_id)?;
    let store = Arc::new(SessionStore::new(backend, identity.subscribe(), notices));
    let deletes = Arc::new(DeleteController::new(Arc::clone(&store)));

    let services = Services {
        store,
        deletes,
        identity,
        principal_id,
    };

    let mut runtime = TuiRuntime::new(config, services, notices_rx)?;
    runtime.run().await
}
