//! Toast notices shown in the status line.
//!
//! Core notices settle in place by id; locally raised notices (validation
//! errors from the reducer) get their own id space.

use std::time::{Duration, Instant};

pub use cafe_core::notice::NoticeKind;
use cafe_core::notice::{Notice, NoticeId};

/// How long a settled notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    Core(NoticeId),
    Local(u64),
}

#[derive(Debug, Clone)]
pub struct NoticeEntry {
    pub key: EntryKey,
    pub kind: NoticeKind,
    pub message: String,
    pub updated: Instant,
}

impl NoticeEntry {
    fn expired(&self, now: Instant) -> bool {
        self.kind != NoticeKind::Loading && now.duration_since(self.updated) >= NOTICE_TTL
    }
}

#[derive(Debug, Default)]
pub struct NoticeState {
    entries: Vec<NoticeEntry>,
    next_local: u64,
}

impl NoticeState {
    /// Applies a core notice, replacing the entry with the same id.
    pub fn apply(&mut self, notice: Notice) {
        self.upsert(EntryKey::Core(notice.id), notice.kind, notice.message);
    }

    pub fn push_local(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let key = EntryKey::Local(self.next_local);
        self.next_local += 1;
        self.upsert(key, kind, message.into());
    }

    fn upsert(&mut self, key: EntryKey, kind: NoticeKind, message: String) {
        let updated = Instant::now();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.kind = kind;
            entry.message = message;
            entry.updated = updated;
            return;
        }
        self.entries.push(NoticeEntry {
            key,
            kind,
            message,
            updated,
        });
    }

    /// Drops settled notices older than their TTL.
    pub fn expire(&mut self, now: Instant) {
        self.entries.retain(|e| !e.expired(now));
    }

    /// Newest first, capped.
    pub fn visible(&self) -> impl Iterator<Item = &NoticeEntry> {
        self.entries.iter().rev().take(MAX_VISIBLE)
    }

    pub fn latest(&self) -> Option<&NoticeEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
