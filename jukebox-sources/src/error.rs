//! Error types for the source-module layer.

use thiserror::Error;

/// Errors that can occur while adding a media server source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The discovery core failed (initialization, search dispatch).
    #[error("discovery failed: {0}")]
    Discovery(#[from] jukebox_discovery::DiscoveryError),

    /// The host asked for a source kind this module does not offer.
    #[error("source kind {0} is not offered by this module")]
    UnknownSourceKind(usize),
}

/// Result type for source-module operations.
pub type Result<T> = std::result::Result<T, SourceError>;
