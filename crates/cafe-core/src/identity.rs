//! Identity gate: the watchable sign-in status the core subscribes to.
//!
//! The authentication provider itself lives outside this crate. Whatever
//! drives it publishes [`IdentityStatus`] values through an [`IdentityGate`];
//! consumers hold a [`watch::Receiver`] and never poll.

use tokio::sync::watch;

/// Snapshot of the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityStatus {
    /// The provider has finished its initial load.
    pub loaded: bool,
    pub signed_in: bool,
    pub principal_id: Option<String>,
}

impl IdentityStatus {
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn signed_out() -> Self {
        Self {
            loaded: true,
            signed_in: false,
            principal_id: None,
        }
    }

    pub fn signed_in(principal_id: impl Into<String>) -> Self {
        Self {
            loaded: true,
            signed_in: true,
            principal_id: Some(principal_id.into()),
        }
    }

    /// True when the core may issue calls on behalf of the principal.
    pub fn is_ready(&self) -> bool {
        self.loaded && self.signed_in
    }
}

/// Publisher side of the identity status.
#[derive(Debug)]
pub struct IdentityGate {
    tx: watch::Sender<IdentityStatus>,
}

impl IdentityGate {
    pub fn new(initial: IdentityStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentityStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> IdentityStatus {
        self.tx.borrow().clone()
    }

    /// Publishes a new status. Identical values do not wake subscribers.
    pub fn set(&self, status: IdentityStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    pub fn sign_in(&self, principal_id: impl Into<String>) {
        self.set(IdentityStatus::signed_in(principal_id));
    }

    pub fn sign_out(&self) {
        self.set(IdentityStatus::signed_out());
    }
}

impl Default for IdentityGate {
    fn default() -> Self {
        Self::new(IdentityStatus::loading())
    }
}

/// What a status change means for the session cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityTransition {
    /// Entered `(loaded, signed_in)`, or switched principal while signed in.
    SignedIn,
    /// Left `(loaded, signed_in)`.
    SignedOut,
    Unchanged,
}

/// Edge detector keyed to identity transitions rather than observation count.
#[derive(Debug, Default)]
pub struct RefreshTrigger {
    ready: bool,
    principal_id: Option<String>,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, status: &IdentityStatus) -> IdentityTransition {
        let ready = status.is_ready();
        let transition = match (self.ready, ready) {
            (false, true) => IdentityTransition::SignedIn,
            (true, false) => IdentityTransition::SignedOut,
            (true, true) if self.principal_id != status.principal_id => {
                IdentityTransition::SignedIn
            }
            _ => IdentityTransition::Unchanged,
        };
        self.ready = ready;
        self.principal_id = if ready {
            status.principal_id.clone()
        } else {
            None
        };
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_fires_once_per_transition() {
        let mut trigger = RefreshTrigger::new();

        assert_eq!(
            trigger.observe(&IdentityStatus::loading()),
            IdentityTransition::Unchanged
        );
        assert_eq!(
            trigger.observe(&IdentityStatus::signed_in("u1")),
            IdentityTransition::SignedIn
        );
        // Re-observing the same status (a re-render) is not a transition.
        assert_eq!(
            trigger.observe(&IdentityStatus::signed_in("u1")),
            IdentityTransition::Unchanged
        );
        assert_eq!(
            trigger.observe(&IdentityStatus::signed_out()),
            IdentityTransition::SignedOut
        );
        assert_eq!(
            trigger.observe(&IdentityStatus::signed_in("u1")),
            IdentityTransition::SignedIn
        );
    }

    #[test]
    fn test_signed_in_without_loaded_never_fires() {
        let mut trigger = RefreshTrigger::new();
        let status = IdentityStatus {
            loaded: false,
            signed_in: true,
            principal_id: Some("u1".to_string()),
        };
        assert_eq!(trigger.observe(&status), IdentityTransition::Unchanged);
    }

    #[test]
    fn test_principal_switch_counts_as_sign_in() {
        let mut trigger = RefreshTrigger::new();
        trigger.observe(&IdentityStatus::signed_in("u1"));
        assert_eq!(
            trigger.observe(&IdentityStatus::signed_in("u2")),
            IdentityTransition::SignedIn
        );
    }

    #[test]
    fn test_gate_skips_identical_updates() {
        let gate = IdentityGate::new(IdentityStatus::signed_out());
        let mut rx = gate.subscribe();
        rx.mark_unchanged();

        gate.sign_out();
        assert!(!rx.has_changed().unwrap());

        gate.sign_in("u1");
        assert!(rx.has_changed().unwrap());
        assert_eq!(gate.current().principal_id.as_deref(), Some("u1"));
    }
}
