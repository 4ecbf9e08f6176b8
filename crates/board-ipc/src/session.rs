//! Per-connection session state handed to every handler.

use std::sync::Arc;

use board_protocol_types::{ChannelKey, SessionId, UserId};
use channel_registry::ChannelRegistry;
use parking_lot::RwLock;

/// The session a request arrived on.
///
/// Cheap to clone; clones refer to the same session.
#[derive(Clone)]
pub struct SessionContext {
    session_id: SessionId,
    user: Arc<RwLock<Option<UserId>>>,
    registry: ChannelRegistry,
}

impl SessionContext {
    pub fn new(session_id: SessionId, registry: ChannelRegistry) -> Self {
        Self {
            session_id,
            user: Arc::new(RwLock::new(None)),
            registry,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The user this session identified as, if any.
    pub fn user(&self) -> Option<UserId> {
        *self.user.read()
    }

    /// Bind the session to a user. Returns the previously bound user.
    pub fn identify(&self, user: UserId) -> Option<UserId> {
        self.user.write().replace(user)
    }

    /// Join a channel on behalf of this session.
    pub fn join(&self, key: ChannelKey) -> bool {
        self.registry.join(&self.session_id, key)
    }

    /// Leave a channel on behalf of this session.
    pub fn leave(&self, key: ChannelKey) -> bool {
        self.registry.leave(&self.session_id, key)
    }

    /// Channels this session has joined.
    pub fn channels(&self) -> Vec<ChannelKey> {
        self.registry.channels_of(&self.session_id)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id)
            .field("user", &self.user())
            .finish()
    }
}
