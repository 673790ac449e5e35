//! Async task bookkeeping.
//!
//! The reducer hands out a [`TaskId`] when it emits an effect; the runtime
//! reports `TaskStarted`/`TaskCompleted` for that id. A completion whose id
//! is no longer active (superseded or the owner unmounted) is dropped.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Store create (+ first message hand-off) from the composer.
    ComposeSubmit,
    /// Store create from the sidebar, no draft attached.
    SessionCreate,
    SessionLoad,
    AttachmentResolve,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskStarted {
    pub id: TaskId,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub started_at: Option<Instant>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Claims the slot for `id` before the effect is emitted.
    pub fn begin(&mut self, id: TaskId) {
        self.active = Some(id);
        self.started_at = None;
    }

    /// Records the runtime's start acknowledgement for the active task.
    ///
    /// A slot released in the meantime stays released.
    pub fn on_started(&mut self, started: TaskStarted) {
        if self.active == Some(started.id) {
            self.started_at = Some(Instant::now());
        }
    }

    /// Time since the runtime started the active task.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|at| at.elapsed())
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.started_at = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub compose_submit: TaskState,
    pub session_create: TaskState,
    pub session_load: TaskState,
    pub attachment_resolve: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::ComposeSubmit => &self.compose_submit,
            TaskKind::SessionCreate => &self.session_create,
            TaskKind::SessionLoad => &self.session_load,
            TaskKind::AttachmentResolve => &self.attachment_resolve,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::ComposeSubmit => &mut self.compose_submit,
            TaskKind::SessionCreate => &mut self.session_create,
            TaskKind::SessionLoad => &mut self.session_load,
            TaskKind::AttachmentResolve => &mut self.attachment_resolve,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.compose_submit.is_running()
            || self.session_create.is_running()
            || self.session_load.is_running()
            || self.attachment_resolve.is_running()
    }
}
