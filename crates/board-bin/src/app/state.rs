//! Server state definition.

use std::sync::Arc;

use board_store::Board;
use channel_registry::ChannelRegistry;

use crate::app::Presence;
use crate::fanout_adapter::FanOutSink;

/// The store as the server runs it: every committed write fans out.
pub type ServerBoard = Board<FanOutSink>;

/// Shared server state (thread-safe).
#[derive(Clone)]
pub struct AppState {
    /// Board store; emits into the registry.
    pub board: Arc<ServerBoard>,
    /// Channel membership of connected sessions.
    pub registry: ChannelRegistry,
    /// Connected sessions per identified user.
    pub presence: Arc<Presence>,
}

impl AppState {
    pub fn new(board: ServerBoard, registry: ChannelRegistry) -> Self {
        Self {
            board: Arc::new(board),
            registry,
            presence: Arc::new(Presence::new()),
        }
    }
}
