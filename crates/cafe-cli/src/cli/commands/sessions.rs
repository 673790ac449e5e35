//! Session command handlers.
//!
//! Each command builds its own store over the configured backend and prints
//! the store's notices as they happen.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use cafe_core::config::{Config, paths};
use cafe_core::notice::{Notice, NoticeKind, Notices, Notifier};
use cafe_core::{
    DeleteController, DeleteOutcome, IdentityGate, IdentityStatus, SessionStore, models, sync,
};
use cafe_types::NewMessage;
use chrono::Local;

/// Prints notices as plain lines; errors go to stderr.
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Loading | NoticeKind::Success => println!("{}", notice.message),
            NoticeKind::Error => eprintln!("{}", notice.message),
        }
    }
}

/// A signed-in store for one command. The gate must outlive the store calls.
struct Connection {
    _identity: IdentityGate,
    store: Arc<SessionStore>,
}

fn connect(config: &Config) -> Result<Connection> {
    if !config.has_credentials() {
        anyhow::bail!(
            "Not signed in. Set CAFE_TOKEN or [auth] token in {}, or pass --offline.",
            paths::config_path().display()
        );
    }
    let principal_id = config
        .principal_id()
        .unwrap_or_else(|| "me".to_string());
    let identity = IdentityGate::new(IdentityStatus::signed_in(principal_id.clone()));
    let backend = sync::from_config(config, &principal_id).context("build session client")?;
    let store = SessionStore::new(
        backend,
        identity.subscribe(),
        Notices::new(Arc::new(PrintNotifier)),
    );
    Ok(Connection {
        _identity: identity,
        store: Arc::new(store),
    })
}

pub async fn list(config: &Config) -> Result<()> {
    let conn = connect(config)?;
    conn.store.refresh().await.context("list cafes")?;

    let sessions = conn.store.snapshot();
    if sessions.is_empty() {
        println!("No cafes found.");
        return Ok(());
    }
    for s in sessions {
        let updated = s.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!("{}  {}  {}", s.id, s.name, updated);
    }
    Ok(())
}

pub async fn create(config: &Config, message: Option<&str>, model: Option<&str>) -> Result<()> {
    let model = model.unwrap_or(&config.model);
    if models::find(model).is_none() {
        let known: Vec<&str> = models::MODELS.iter().map(|m| m.id).collect();
        anyhow::bail!("Unknown model '{model}' (expected one of: {})", known.join(", "));
    }
    let message = message.map(str::trim).filter(|m| !m.is_empty());

    let conn = connect(config)?;
    let created = conn.store.create().await.context("create cafe")?;
    println!("{}  {}", created.id, created.name);

    if let Some(content) = message {
        conn.store
            .post_message(&NewMessage {
                content: content.to_string(),
                image_url: None,
                session_id: created.id.clone(),
                model: model.to_string(),
            })
            .await
            .with_context(|| format!("post first message to '{}'", created.id))?;
    }
    Ok(())
}

pub async fn delete(config: &Config, id: &str) -> Result<()> {
    let conn = connect(config)?;
    // Populates names for the notices; a stale list is not fatal.
    if let Err(err) = conn.store.refresh().await {
        tracing::warn!(error = %err, "Refresh before delete failed");
    }

    let deletes = DeleteController::new(Arc::clone(&conn.store));
    match deletes.request_delete(id).await {
        DeleteOutcome::Deleted(_) | DeleteOutcome::Skipped => Ok(()),
        DeleteOutcome::Failed(err) => {
            Err(anyhow!(err)).with_context(|| format!("delete cafe '{id}'"))
        }
    }
}

pub async fn show(config: &Config, id: &str) -> Result<()> {
    let conn = connect(config)?;
    let detail = conn
        .store
        .load_detail(id)
        .await
        .with_context(|| format!("load cafe '{id}'"))?;

    println!("{}  {}", detail.session.name, detail.session.id);
    if detail.messages.is_empty() {
        println!("(no messages)");
    }
    for message in &detail.messages {
        let at = message.created_at.with_timezone(&Local).format("%H:%M");
        println!();
        println!("[{at}] {}:", message.sender.label());
        println!("{}", message.content);
        if let Some(url) = &message.image_url {
            println!("[image] {url}");
        }
    }
    Ok(())
}
