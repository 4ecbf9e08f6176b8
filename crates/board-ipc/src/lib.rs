//! IPC layer between the roomboard server and its clients.
//!
//! This crate provides:
//! - Unix domain socket server, one registry session per connection
//! - JSON-RPC-like protocol: requests in, response and event frames out
//! - Clients for one-shot calls and long-lived sessions

mod client;
mod error;
mod server;
mod session;

pub use board_protocol_types::{error_codes, Event, Frame, Method, Request, Response};
pub use client::{ClientConnection, IpcClient};
pub use error::{IpcError, IpcResult};
pub use server::IpcServer;
pub use session::SessionContext;
