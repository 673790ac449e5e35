//! Error types for session synchronisation and the session store.

use thiserror::Error;

/// Failure of a single round-trip against the session collection endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("Network failure: {0}")]
    Network(String),

    /// HTTP 401. Never retried.
    #[error("Unauthorized")]
    Unauthorized,

    /// The session (or route) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the request payload.
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("Server error (HTTP {status})")]
    Server { status: u16 },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Refused locally because the identity gate is not signed in.
    #[error("Not signed in")]
    SignedOut,
}

impl SyncError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Failure of a store-level mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to create session: {0}")]
    CreateFailed(#[source] SyncError),

    #[error("Failed to refresh sessions: {0}")]
    RefreshFailed(#[source] SyncError),

    #[error("Failed to delete session '{id}': {source}")]
    DeleteFailed {
        id: String,
        #[source]
        source: SyncError,
    },

    #[error("Failed to post message to session '{id}': {source}")]
    PostFailed {
        id: String,
        #[source]
        source: SyncError,
    },
}

impl StoreError {
    /// The underlying round-trip failure.
    pub fn sync_error(&self) -> &SyncError {
        match self {
            Self::CreateFailed(source) | Self::RefreshFailed(source) => source,
            Self::DeleteFailed { source, .. } | Self::PostFailed { source, .. } => source,
        }
    }
}
