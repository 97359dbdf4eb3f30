//! Error types for the discovery core.

use thiserror::Error;

/// Errors surfaced by the discovery session and its controller.
///
/// Nothing here is fatal to the host application: every failure degrades to
/// "device not added" or "search not started", and the selection dialog
/// simply shows an empty list.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Control point startup failed (worker runtime or HTTP client).
    #[error("control point initialization failed: {0}")]
    Initialization(String),

    /// A device's description document could not be fetched.
    #[error("network error: {0}")]
    Network(String),

    /// A description document or search target could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// `start_search` was called before `ensure_initialized`.
    #[error("control point is not initialized")]
    NotInitialized,

    /// The background worker is gone; the command could not be delivered.
    #[error("discovery worker disconnected")]
    WorkerDisconnected,

    /// Internal synchronization error.
    #[error("internal synchronization error: {0}")]
    Sync(String),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
