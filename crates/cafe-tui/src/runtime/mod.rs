//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the Elm runtime boundary. All side effects happen here; the
//! reducer stays pure and produces effects.
//!
//! ## Inbox Pattern
//!
//! Effect handlers and core subscriptions post `UiEvent`s to `inbox_tx`.
//! The loop waits on terminal input, the inbox and the tick timer at once,
//! then drains whatever else is already queued before rendering.
//!
//! - `mod.rs`: `TuiRuntime`, event loop, effect dispatch
//! - `inbox.rs`: inbox channel types
//! - `handlers.rs`: effect handler implementations

mod handlers;
mod inbox;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cafe_core::config::Config;
use cafe_core::notice::Notice;
use cafe_core::{DeleteController, IdentityGate, SessionStore};
use crossterm::event::EventStream;
use futures_util::StreamExt;
use inbox::{UiEventReceiver, UiEventSender};
use tokio::sync::{mpsc, watch};

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::{self, Tui};
use crate::{render, update};

/// Tick cadence while a task or notice is animating.
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Tick cadence when idle.
pub const IDLE_TICK_DURATION: Duration = Duration::from_millis(500);

/// Core handles the runtime executes effects against.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<SessionStore>,
    pub deletes: Arc<DeleteController>,
    pub identity: Arc<IdentityGate>,
    /// Principal to sign in as when the user toggles sign-in.
    pub principal_id: String,
}

/// Full-screen TUI runtime.
pub struct TuiRuntime {
    terminal: Tui,
    pub state: AppState,
    services: Services,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
}

impl TuiRuntime {
    /// Enters the alternate screen and wires core subscriptions to the inbox.
    ///
    /// `notices_rx` is the receiving end of the store's notice channel.
    pub fn new(
        config: &Config,
        services: Services,
        notices_rx: mpsc::UnboundedReceiver<Notice>,
    ) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let runtime = Self {
            terminal,
            state: AppState::new(config),
            services,
            inbox_tx,
            inbox_rx,
        };
        runtime.spawn_subscriptions(notices_rx);
        Ok(runtime)
    }

    /// Runs the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop().await;
        let _ = terminal::disable_input_features();
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let mut input = EventStream::new();
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let size = self.terminal.size()?;
            self.dispatch_event(UiEvent::Frame {
                width: size.width,
                height: size.height,
            });

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }

            let tick = if self.is_animating() {
                FRAME_DURATION
            } else {
                IDLE_TICK_DURATION
            };

            let event = tokio::select! {
                maybe = input.next() => match maybe {
                    Some(Ok(event)) => UiEvent::Terminal(event),
                    Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                    None => break,
                },
                Some(event) = self.inbox_rx.recv() => event,
                () = tokio::time::sleep(tick) => UiEvent::Tick,
            };
            self.dispatch_event(event);

            while let Ok(event) = self.inbox_rx.try_recv() {
                self.dispatch_event(event);
            }
            dirty = true;
        }

        Ok(())
    }

    fn is_animating(&self) -> bool {
        let tui = &self.state.tui;
        tui.tasks.is_any_running() || !tui.sessions.pending.is_empty() || !tui.notices.is_empty()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Forwards core watch channels and notices into the inbox.
    fn spawn_subscriptions(&self, mut notices_rx: mpsc::UnboundedReceiver<Notice>) {
        forward_watch(
            self.services.identity.subscribe(),
            self.inbox_tx.clone(),
            UiEvent::Identity,
        );
        forward_watch(
            self.services.store.subscribe(),
            self.inbox_tx.clone(),
            UiEvent::SessionsChanged,
        );
        forward_watch(
            self.services.deletes.subscribe_pending(),
            self.inbox_tx.clone(),
            UiEvent::PendingDeletesChanged,
        );

        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            while let Some(notice) = notices_rx.recv().await {
                if tx.send(UiEvent::Notice(notice)).is_err() {
                    break;
                }
            }
        });

        tokio::spawn(Arc::clone(&self.services.store).watch_identity());
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a handler whose result (if any) goes to the inbox as-is.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<UiEvent>> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if let Some(event) = f().await {
                let _ = tx.send(event);
            }
        });
    }

    /// Spawns a handler with the TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let _ = tx.send(UiEvent::TaskStarted {
            kind,
            started: TaskStarted { id },
        });
        tokio::spawn(async move {
            let completed = TaskCompleted {
                id,
                result: Box::new(f().await),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::SubmitDraft { task, draft } => {
                let store = Arc::clone(&self.services.store);
                self.spawn_task(TaskKind::ComposeSubmit, task, move || async move {
                    handlers::submit_draft(&store, draft).await
                });
            }
            UiEffect::CreateSession { task } => {
                let store = Arc::clone(&self.services.store);
                self.spawn_task(TaskKind::SessionCreate, task, move || async move {
                    handlers::create_session(&store).await
                });
            }
            UiEffect::PostFirstMessage { message } => {
                let store = Arc::clone(&self.services.store);
                self.spawn_effect(move || async move {
                    handlers::post_first_message(&store, message).await
                });
            }
            UiEffect::LoadSession { task, id } => {
                let store = Arc::clone(&self.services.store);
                self.spawn_task(TaskKind::SessionLoad, task, move || async move {
                    handlers::load_session(&store, id).await
                });
            }
            UiEffect::DeleteSession { id } => {
                let deletes = Arc::clone(&self.services.deletes);
                self.spawn_effect(move || async move {
                    handlers::delete_session(&deletes, &id).await;
                    None
                });
            }
            UiEffect::ResolveAttachment { task, path } => {
                self.spawn_task(TaskKind::AttachmentResolve, task, move || {
                    handlers::resolve_attachment(path)
                });
            }
            UiEffect::SetIdentity { signed_in } => {
                if signed_in {
                    self.services
                        .identity
                        .sign_in(self.services.principal_id.clone());
                } else {
                    self.services.identity.sign_out();
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

/// Sends the current value, then every change, until either side closes.
fn forward_watch<T, F>(mut rx: watch::Receiver<T>, tx: UiEventSender, wrap: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> UiEvent + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let value = rx.borrow_and_update().clone();
            if tx.send(wrap(value)).is_err() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });
}
