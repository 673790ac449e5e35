//! Transient notifications for mutating calls.
//!
//! Each mutation emits a `Loading` notice and later settles it with a
//! `Success` or `Error` notice carrying the same [`NoticeId`], so a
//! presenter can replace the loading line in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
}

/// Notification collaborator.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Issues notice ids and forwards notices to a [`Notifier`].
#[derive(Clone)]
pub struct Notices {
    sink: Arc<dyn Notifier>,
    seq: Arc<AtomicU64>,
}

impl Notices {
    pub fn new(sink: Arc<dyn Notifier>) -> Self {
        Self {
            sink,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emits a loading notice and returns the id that settles it.
    pub fn loading(&self, message: impl Into<String>) -> NoticeId {
        let id = NoticeId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.emit(id, NoticeKind::Loading, message.into());
        id
    }

    pub fn success(&self, id: NoticeId, message: impl Into<String>) {
        self.emit(id, NoticeKind::Success, message.into());
    }

    pub fn error(&self, id: NoticeId, message: impl Into<String>) {
        self.emit(id, NoticeKind::Error, message.into());
    }

    fn emit(&self, id: NoticeId, kind: NoticeKind, message: String) {
        self.sink.notify(Notice { id, kind, message });
    }
}

impl std::fmt::Debug for Notices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notices")
            .field("seq", &self.seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Notifier implementations
// ============================================================================

/// Writes notices to the tracing log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Loading => tracing::debug!(notice_id = notice.id.0, "{}", notice.message),
            NoticeKind::Success => tracing::info!(notice_id = notice.id.0, "{}", notice.message),
            NoticeKind::Error => tracing::warn!(notice_id = notice.id.0, "{}", notice.message),
        }
    }
}

/// Forwards notices into a channel (the UI inbox).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Notice>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Receiver gone means the UI is shutting down.
        let _ = self.tx.send(notice);
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(notice);
        }
    }
}
