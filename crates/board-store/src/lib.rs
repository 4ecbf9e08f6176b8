//! # Board store
//!
//! A SQLite-backed store for the roomboard: users, posts, comments, likes,
//! bookmarks and direct messages. Every committed mutation emits exactly one
//! side-effect carrying the canonical record.
//!
//! ## Principles
//!
//! - **SQLite is the only durable store** - Every write commits to SQLite first
//! - **Side-effects reflect committed reality** - Emitted after commit, never on failure
//! - **Side-effects follow commit order** - Emitted while the write lock is still held
//! - **Recovery emits nothing** - Startup resets presence silently
//!
//! ## Architecture
//!
//! ```text
//! WRITE:
//!   validate → SQLite → side-effect
//!
//! READ:
//!   SQLite → canonical record
//! ```
//!
//! ## Example
//!
//! ```rust
//! use board_store::{Board, BoardWriter, NewPost, NewUser, RecordingSink, SideEffect};
//! use board_protocol_types::PostKind;
//!
//! let board = Board::in_memory(RecordingSink::new()).unwrap();
//! let user = board
//!     .register_user(NewUser {
//!         username: "alice".to_string(),
//!         phone: "+15550100".to_string(),
//!     })
//!     .unwrap();
//!
//! let post = board
//!     .create_post(
//!         user.id,
//!         NewPost {
//!             kind: PostKind::Room,
//!             title: "Sunny room".to_string(),
//!             content: "Near the station".to_string(),
//!             location: None,
//!         },
//!     )
//!     .unwrap();
//!
//! assert_eq!(board.sink().effects(), vec![SideEffect::PostCreated(post)]);
//! ```
//!
//! ## Crate Structure
//!
//! - [`board`] - The store engine
//! - [`reader`] - Read-side trait
//! - [`writer`] - Write-side trait
//! - [`side_effect`] - Side-effect contracts
//! - [`types`] - Write inputs and outcomes
//! - [`validation`] - Input limits

mod board;
mod migrations;
mod queries;
pub mod reader;
pub mod side_effect;
pub mod types;
pub mod validation;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::board::Board;
pub use reader::BoardReader;
pub use side_effect::{NullSink, RecordingSink, SideEffect, SideEffectSink};
pub use types::{LikeToggle, NewComment, NewPost, NewUser, PostUpdate};
pub use writer::BoardWriter;

/// Errors that can occur in the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller may not touch the record.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Write conflicts with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
