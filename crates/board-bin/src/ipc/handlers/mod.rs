//! IPC handler implementations.
//!
//! Each handler module contains thin handlers: read params, check the
//! session, call the board store. Fan-out happens inside the store's sink.

pub mod channel;
pub mod chat;
pub mod comment;
mod common;
pub mod health;
pub mod post;
pub mod reaction;
pub mod user;
