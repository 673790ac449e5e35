//! In-memory [`SessionSync`] used offline and as a test double.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cafe_types::{Message, NewMessage, Sender, Session, SessionDetail};
use chrono::Utc;

use super::{SessionSync, SyncResult};
use crate::error::SyncError;

const DEFAULT_SESSION_NAME: &str = "New Cafe";

/// Operation selector for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOp {
    List,
    Create,
    Delete,
    GetOne,
    PostMessage,
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: Vec<Session>,
    messages: HashMap<String, Vec<Message>>,
    failures: HashMap<SyncOp, SyncError>,
    calls: HashMap<SyncOp, usize>,
}

#[derive(Debug)]
pub struct MemorySessionSync {
    principal_id: String,
    latency: Option<Duration>,
    state: Mutex<MemoryState>,
}

impl MemorySessionSync {
    pub fn new(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            latency: None,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Delays every call, so callers observe an in-flight window.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seeds sessions with the given names, returning their ids.
    pub fn seed<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        names
            .into_iter()
            .map(|name| {
                let session = self.new_session(name.into());
                let id = session.id.clone();
                state.sessions.push(session);
                id
            })
            .collect()
    }

    /// Makes every later call of `op` fail with `error`.
    pub fn fail(&self, op: SyncOp, error: SyncError) {
        self.lock().failures.insert(op, error);
    }

    pub fn recover(&self, op: SyncOp) {
        self.lock().failures.remove(&op);
    }

    /// Number of calls of `op` received so far, failed ones included.
    pub fn calls(&self, op: SyncOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a panicking test; the data is still usable.
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn new_session(&self, name: String) -> Session {
        let now = Utc::now();
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            owner_principal_id: self.principal_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Counts the call, waits out the latency, then applies any injected failure.
    async fn enter(&self, op: SyncOp) -> SyncResult<()> {
        *self.lock().calls.entry(op).or_default() += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.lock().failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionSync for MemorySessionSync {
    async fn list(&self) -> SyncResult<Vec<Session>> {
        self.enter(SyncOp::List).await?;
        let state = self.lock();
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.owner_principal_id == self.principal_id)
            .cloned()
            .collect())
    }

    async fn create(&self) -> SyncResult<Session> {
        self.enter(SyncOp::Create).await?;
        let session = self.new_session(DEFAULT_SESSION_NAME.to_string());
        self.lock().sessions.push(session.clone());
        Ok(session)
    }

    async fn delete(&self, id: &str) -> SyncResult<Session> {
        self.enter(SyncOp::Delete).await?;
        let mut state = self.lock();
        let idx = state
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SyncError::not_found(id))?;
        state.messages.remove(id);
        Ok(state.sessions.remove(idx))
    }

    async fn get_one(&self, id: &str) -> SyncResult<SessionDetail> {
        self.enter(SyncOp::GetOne).await?;
        let state = self.lock();
        let session = state
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| SyncError::not_found(id))?;
        let messages = state.messages.get(id).cloned().unwrap_or_default();
        Ok(SessionDetail { session, messages })
    }

    async fn post_message(&self, message: &NewMessage) -> SyncResult<Message> {
        self.enter(SyncOp::PostMessage).await?;
        if message.content.trim().is_empty() {
            return Err(SyncError::validation("message is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == message.session_id)
            .ok_or_else(|| SyncError::not_found(&message.session_id))?;
        session.updated_at = now;

        let stored = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: message.session_id.clone(),
            sender: Sender::User,
            content: message.content.clone(),
            image_url: message.image_url.clone(),
            model: Some(message.model.clone()),
            created_at: now,
        };
        state
            .messages
            .entry(message.session_id.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_default_name_and_owner() {
        let sync = MemorySessionSync::new("u1");
        let session = sync.create().await.unwrap();

        assert_eq!(session.name, "New Cafe");
        assert_eq!(session.owner_principal_id, "u1");
        assert_eq!(sync.list().await.unwrap(), vec![session]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let sync = MemorySessionSync::new("u1");
        assert!(sync.delete("nope").await.unwrap_err().is_not_found());
        assert!(sync.get_one("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_posted_messages_show_up_in_detail() {
        let sync = MemorySessionSync::new("u1");
        let ids = sync.seed(["A"]);

        sync.post_message(&NewMessage {
            content: "hello".to_string(),
            image_url: Some("file:///tmp/a.png".to_string()),
            session_id: ids[0].clone(),
            model: "claude-3".to_string(),
        })
        .await
        .unwrap();

        let detail = sync.get_one(&ids[0]).await.unwrap();
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages[0].sender, Sender::User);
        assert_eq!(detail.messages[0].model.as_deref(), Some("claude-3"));
    }

    #[tokio::test]
    async fn test_injected_failure_is_counted() {
        let sync = MemorySessionSync::new("u1");
        sync.fail(SyncOp::Create, SyncError::Unauthorized);

        assert_eq!(sync.create().await.unwrap_err(), SyncError::Unauthorized);
        assert_eq!(sync.calls(SyncOp::Create), 1);
        assert!(sync.list().await.unwrap().is_empty());

        sync.recover(SyncOp::Create);
        assert!(sync.create().await.is_ok());
    }
}
