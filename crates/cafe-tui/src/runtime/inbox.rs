//! Inbox channel types.
//!
//! Effect handlers and core subscriptions post `UiEvent`s here; the runtime
//! feeds them to the reducer in arrival order.

use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;
