//! Session Store: the single client-side cache of the principal's sessions.
//!
//! The cache lives in a [`watch`] channel. Every mutation goes through
//! `send_modify`/`send_if_modified`, so it applies to the latest value and
//! subscribers only ever observe whole snapshots.
//!
//! A refresh can be in flight while creates and removes settle. Those edits
//! are journaled and replayed onto the fetched list, so a refresh never drops
//! a session created after its request went out, nor resurrects one removed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cafe_types::{Message, NewMessage, Session, SessionDetail};
use tokio::sync::watch;

use crate::error::{StoreError, SyncError};
use crate::identity::{IdentityStatus, IdentityTransition, RefreshTrigger};
use crate::notice::Notices;
use crate::sync::{SessionSync, SyncResult};

/// A cache edit applied while a refresh was outstanding.
#[derive(Debug, Clone)]
enum CacheEdit {
    Added(Session),
    Removed(String),
}

#[derive(Debug, Default)]
struct Journal {
    seq: u64,
    refreshing: usize,
    edits: Vec<(u64, CacheEdit)>,
}

impl Journal {
    fn begin_refresh(&mut self) -> u64 {
        self.refreshing += 1;
        self.seq
    }

    fn record(&mut self, edit: CacheEdit) {
        if self.refreshing > 0 {
            self.edits.push((self.seq, edit));
        }
        self.seq += 1;
    }

    /// Edits recorded since `since`, in order. Drops the journal once no
    /// refresh is outstanding.
    fn end_refresh(&mut self, since: u64) -> Vec<CacheEdit> {
        let edits = self
            .edits
            .iter()
            .filter(|(seq, _)| *seq >= since)
            .map(|(_, edit)| edit.clone())
            .collect();
        self.refreshing = self.refreshing.saturating_sub(1);
        if self.refreshing == 0 {
            self.edits.clear();
        }
        edits
    }
}

fn replay(list: &mut Vec<Session>, edits: Vec<CacheEdit>) {
    for edit in edits {
        match edit {
            CacheEdit::Added(session) => {
                if !list.iter().any(|s| s.id == session.id) {
                    list.push(session);
                }
            }
            CacheEdit::Removed(id) => list.retain(|s| s.id != id),
        }
    }
}

pub struct SessionStore {
    sync: Arc<dyn SessionSync>,
    identity: watch::Receiver<IdentityStatus>,
    notices: Notices,
    sessions: watch::Sender<Vec<Session>>,
    journal: Mutex<Journal>,
}

impl SessionStore {
    pub fn new(
        sync: Arc<dyn SessionSync>,
        identity: watch::Receiver<IdentityStatus>,
        notices: Notices,
    ) -> Self {
        let (sessions, _rx) = watch::channel(Vec::new());
        Self {
            sync,
            identity,
            notices,
            sessions,
            journal: Mutex::new(Journal::default()),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn subscribe(&self) -> watch::Receiver<Vec<Session>> {
        self.sessions.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.borrow().iter().find(|s| s.id == id).cloned()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.borrow().is_ready()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replaces the cache with the server's list.
    ///
    /// Creates and removes that settle while the request is out are replayed
    /// onto the fetched list. On failure the cache keeps its previous value.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.ensure_signed_in()
            .map_err(StoreError::RefreshFailed)?;

        let since = self.journal().begin_refresh();
        let result = self.sync.list().await;

        let mut journal = self.journal();
        let edits = journal.end_refresh(since);
        match result {
            Ok(mut list) => {
                let replayed = edits.len();
                replay(&mut list, edits);
                tracing::info!(count = list.len(), replayed, "Sessions refreshed");
                self.sessions.send_replace(list);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Session refresh failed");
                Err(StoreError::RefreshFailed(err))
            }
        }
    }

    /// Creates a session with server defaults and appends it.
    pub async fn create(&self) -> Result<Session, StoreError> {
        let notice = self.notices.loading("Creating cafe...");

        let result = match self.ensure_signed_in() {
            Ok(()) => self.sync.create().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(session) => {
                let mut journal = self.journal();
                journal.record(CacheEdit::Added(session.clone()));
                self.sessions.send_if_modified(|list| {
                    if list.iter().any(|s| s.id == session.id) {
                        false
                    } else {
                        list.push(session.clone());
                        true
                    }
                });
                drop(journal);
                tracing::info!(session_id = %session.id, "Session created");
                self.notices.success(notice, "Cafe created successfully");
                Ok(session)
            }
            Err(err) => {
                tracing::error!(error = %err, "Session create failed");
                self.notices.error(notice, "Failed to create cafe");
                Err(StoreError::CreateFailed(err))
            }
        }
    }

    /// Drops `id` from the cache. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        let mut journal = self.journal();
        journal.record(CacheEdit::Removed(id.to_string()));
        let removed = self.sessions.send_if_modified(|list| {
            let before = list.len();
            list.retain(|s| s.id != id);
            list.len() != before
        });
        drop(journal);
        if removed {
            tracing::debug!(session_id = %id, "Session removed from cache");
        }
    }

    /// Empties the cache (sign-out).
    pub fn clear(&self) {
        self.sessions.send_if_modified(|list| {
            if list.is_empty() {
                false
            } else {
                list.clear();
                true
            }
        });
    }

    /// Loads one session with its transcript. The cache is not touched.
    pub async fn load_detail(&self, id: &str) -> SyncResult<SessionDetail> {
        self.ensure_signed_in()?;
        self.sync.get_one(id).await.inspect_err(|err| {
            tracing::warn!(session_id = %id, error = %err, "Session detail load failed");
        })
    }

    /// Posts the opening message of a freshly created session.
    pub async fn post_message(&self, message: &NewMessage) -> Result<Message, StoreError> {
        let notice = self.notices.loading("Sending message...");

        let result = match self.ensure_signed_in() {
            Ok(()) => self.sync.post_message(message).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(stored) => {
                tracing::info!(session_id = %message.session_id, "Message posted");
                self.notices.success(notice, "Message sent");
                Ok(stored)
            }
            Err(err) => {
                tracing::error!(session_id = %message.session_id, error = %err, "Message post failed");
                self.notices.error(notice, "Failed to send message");
                Err(StoreError::PostFailed {
                    id: message.session_id.clone(),
                    source: err,
                })
            }
        }
    }

    /// Issues the delete round-trip without touching the cache.
    pub(crate) async fn issue_delete(&self, id: &str) -> SyncResult<Session> {
        self.ensure_signed_in()?;
        self.sync.delete(id).await
    }

    /// Follows the identity gate: refreshes once per sign-in transition and
    /// clears the cache on sign-out. Returns when the gate is dropped.
    pub async fn watch_identity(self: Arc<Self>) {
        let mut rx = self.identity.clone();
        let mut trigger = RefreshTrigger::new();

        loop {
            let status = rx.borrow_and_update().clone();
            match trigger.observe(&status) {
                IdentityTransition::SignedIn => {
                    tracing::debug!(principal_id = ?status.principal_id, "Identity ready");
                    self.clear();
                    // Failure is already logged and leaves an empty list.
                    let _ = self.refresh().await;
                }
                IdentityTransition::SignedOut => {
                    tracing::debug!("Identity signed out, clearing sessions");
                    self.clear();
                }
                IdentityTransition::Unchanged => {}
            }

            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_signed_in(&self) -> SyncResult<()> {
        if self.is_signed_in() {
            Ok(())
        } else {
            Err(SyncError::SignedOut)
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::delete::{DeleteController, DeleteOutcome};
    use crate::identity::IdentityGate;
    use crate::notice::{NoticeKind, Notifier, RecordingNotifier};
    use crate::sync::{MemorySessionSync, SyncOp};

    struct Fixture {
        gate: IdentityGate,
        sync: Arc<MemorySessionSync>,
        recorder: Arc<RecordingNotifier>,
        store: Arc<SessionStore>,
    }

    fn fixture_with(sync: MemorySessionSync, status: IdentityStatus) -> Fixture {
        let gate = IdentityGate::new(status);
        let sync = Arc::new(sync);
        let recorder = Arc::new(RecordingNotifier::new());
        let store = Arc::new(SessionStore::new(
            Arc::clone(&sync) as Arc<dyn SessionSync>,
            gate.subscribe(),
            Notices::new(Arc::clone(&recorder) as Arc<dyn Notifier>),
        ));
        Fixture {
            gate,
            sync,
            recorder,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            MemorySessionSync::new("u1"),
            IdentityStatus::signed_in("u1"),
        )
    }

    fn ids(store: &SessionStore) -> Vec<String> {
        store.snapshot().into_iter().map(|s| s.id).collect()
    }

    #[tokio::test]
    async fn test_create_into_empty_store() {
        let f = fixture();

        let session = f.store.create().await.unwrap();

        assert_eq!(session.name, "New Cafe");
        assert_eq!(ids(&f.store), vec![session.id]);
        assert_eq!(
            f.recorder.messages(),
            ["Creating cafe...", "Cafe created successfully"]
        );
    }

    #[tokio::test]
    async fn test_creates_append_in_call_order() {
        let f = fixture();

        let mut created = Vec::new();
        for _ in 0..3 {
            created.push(f.store.create().await.unwrap().id);
        }
        f.sync.fail(SyncOp::Create, SyncError::network("offline"));
        assert!(f.store.create().await.is_err());

        assert_eq!(ids(&f.store), created);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_cache_and_notifies() {
        let f = fixture();
        f.store.create().await.unwrap();
        let before = f.store.snapshot();
        f.sync.fail(SyncOp::Create, SyncError::Unauthorized);

        let err = f.store.create().await.unwrap_err();

        assert_eq!(err, StoreError::CreateFailed(SyncError::Unauthorized));
        assert_eq!(f.store.snapshot(), before);
        let last = f.recorder.notices().pop().unwrap();
        assert_eq!(last.kind, NoticeKind::Error);
        assert_eq!(last.message, "Failed to create cafe");
    }

    #[tokio::test]
    async fn test_remove_is_exact_and_idempotent() {
        let f = fixture();
        let seeded = f.sync.seed(["A", "B", "C"]);
        f.store.refresh().await.unwrap();

        f.store.remove(&seeded[1]);
        f.store.remove(&seeded[1]);
        f.store.remove("unknown");

        assert_eq!(ids(&f.store), vec![seeded[0].clone(), seeded[2].clone()]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_list() {
        let f = fixture();
        f.sync.seed(["A"]);
        f.store.refresh().await.unwrap();
        f.sync.fail(SyncOp::List, SyncError::Server { status: 500 });

        assert!(f.store.refresh().await.is_err());
        assert_eq!(f.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_out_store_issues_no_calls() {
        let f = fixture_with(MemorySessionSync::new("u1"), IdentityStatus::signed_out());

        assert_eq!(
            f.store.refresh().await.unwrap_err(),
            StoreError::RefreshFailed(SyncError::SignedOut)
        );
        assert!(f.store.create().await.is_err());
        assert_eq!(f.sync.calls(SyncOp::List), 0);
        assert_eq!(f.sync.calls(SyncOp::Create), 0);
    }

    /// Lists the server state as of the request, then answers slowly.
    struct SlowListSync {
        inner: MemorySessionSync,
        list_delay: Duration,
        op_delay: Duration,
    }

    #[async_trait]
    impl SessionSync for SlowListSync {
        async fn list(&self) -> SyncResult<Vec<Session>> {
            let list = self.inner.list().await;
            tokio::time::sleep(self.list_delay).await;
            list
        }

        async fn create(&self) -> SyncResult<Session> {
            tokio::time::sleep(self.op_delay).await;
            self.inner.create().await
        }

        async fn delete(&self, id: &str) -> SyncResult<Session> {
            tokio::time::sleep(self.op_delay).await;
            self.inner.delete(id).await
        }

        async fn get_one(&self, id: &str) -> SyncResult<SessionDetail> {
            self.inner.get_one(id).await
        }

        async fn post_message(&self, message: &NewMessage) -> SyncResult<Message> {
            self.inner.post_message(message).await
        }
    }

    fn slow_list_store(seed: &[&str]) -> (IdentityGate, Vec<String>, Arc<SessionStore>) {
        let inner = MemorySessionSync::new("u1");
        let seeded = inner.seed(seed.iter().copied());
        let sync = SlowListSync {
            inner,
            list_delay: Duration::from_millis(50),
            op_delay: Duration::from_millis(5),
        };
        let gate = IdentityGate::new(IdentityStatus::signed_in("u1"));
        let store = Arc::new(SessionStore::new(
            Arc::new(sync),
            gate.subscribe(),
            Notices::new(Arc::new(RecordingNotifier::new())),
        ));
        (gate, seeded, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_in_flight_keeps_session_created_meanwhile() {
        let (_gate, seeded, store) = slow_list_store(&["A"]);

        let (refreshed, created) = tokio::join!(store.refresh(), async {
            let created = store.create().await.unwrap();
            assert_eq!(ids(&store), vec![created.id.clone()]);
            created
        });

        refreshed.unwrap();
        assert_eq!(ids(&store), vec![seeded[0].clone(), created.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_in_flight_does_not_resurrect_removed_session() {
        let (_gate, seeded, store) = slow_list_store(&["A", "B"]);
        store.refresh().await.unwrap();

        let (refreshed, ()) = tokio::join!(store.refresh(), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            store.remove(&seeded[0]);
        });

        refreshed.unwrap();
        assert_eq!(ids(&store), vec![seeded[1].clone()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_refresh_races_create_and_delete() {
        let (gate, seeded, store) = slow_list_store(&["A", "B"]);
        gate.set(IdentityStatus::loading());
        let watcher = tokio::spawn(Arc::clone(&store).watch_identity());
        tokio::time::sleep(Duration::from_millis(1)).await;

        // The sign-in refresh is still out when create and delete settle.
        gate.sign_in("u1");
        tokio::time::sleep(Duration::from_millis(1)).await;
        let deletes = DeleteController::new(Arc::clone(&store));
        let (created, deleted) = tokio::join!(store.create(), deletes.request_delete(&seeded[0]));
        let created = created.unwrap();
        assert!(matches!(deleted, DeleteOutcome::Deleted(_)));
        assert_eq!(ids(&store), vec![created.id.clone()]);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ids(&store), vec![seeded[1].clone(), created.id]);

        drop(gate);
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_and_remove_in_flight_do_not_clobber() {
        let f = fixture_with(
            MemorySessionSync::new("u1").with_latency(Duration::from_millis(10)),
            IdentityStatus::signed_in("u1"),
        );
        let seeded = f.sync.seed(["A", "B"]);
        f.store.refresh().await.unwrap();

        let (created, ()) = tokio::join!(f.store.create(), async {
            f.store.remove(&seeded[0]);
        });

        assert_eq!(ids(&f.store), vec![seeded[1].clone(), created.unwrap().id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_identity_refreshes_once_per_transition() {
        let f = fixture_with(MemorySessionSync::new("u1"), IdentityStatus::loading());
        f.sync.seed(["A"]);
        let watcher = tokio::spawn(Arc::clone(&f.store).watch_identity());
        let mut sessions = f.store.subscribe();

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(f.sync.calls(SyncOp::List), 0);

        f.gate.sign_in("u1");
        sessions.changed().await.unwrap();
        assert_eq!(sessions.borrow_and_update().len(), 1);
        assert_eq!(f.sync.calls(SyncOp::List), 1);

        // Same status again is not a transition.
        f.gate.set(IdentityStatus::signed_in("u1"));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(f.sync.calls(SyncOp::List), 1);

        f.gate.sign_out();
        sessions.changed().await.unwrap();
        assert!(sessions.borrow_and_update().is_empty());

        f.gate.sign_in("u1");
        sessions.changed().await.unwrap();
        assert_eq!(f.sync.calls(SyncOp::List), 2);

        drop(f.gate);
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_post_message_failure_keeps_session() {
        let f = fixture();
        let session = f.store.create().await.unwrap();
        f.sync
            .fail(SyncOp::PostMessage, SyncError::network("connection reset"));

        let err = f
            .store
            .post_message(&NewMessage {
                content: "hello".to_string(),
                image_url: None,
                session_id: session.id.clone(),
                model: "gpt-4".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::PostFailed { .. }));
        assert_eq!(ids(&f.store), vec![session.id]);
        assert_eq!(
            f.recorder.messages().last().map(String::as_str),
            Some("Failed to send message")
        );
    }
}
