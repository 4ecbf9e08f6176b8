//! Registry error types.

use board_protocol_types::SessionId;
use thiserror::Error;

/// Registry error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry is not initialized or has been torn down.
    #[error("channel registry is closed")]
    Closed,

    /// A session with this id is already connected.
    #[error("session already connected: {0}")]
    AlreadyConnected(SessionId),
}

/// Result type alias using RegistryError.
pub type RegistryResult<T> = Result<T, RegistryError>;
