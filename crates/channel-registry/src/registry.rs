//! Channel membership and fan-out.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use board_protocol_types::{ChannelKey, Event, EventPayload, SessionId};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{RegistryError, RegistryResult};

#[derive(Default)]
struct RegistryState {
    open: bool,
    /// Event queue of every connected session.
    sessions: HashMap<SessionId, mpsc::UnboundedSender<Event>>,
    /// Members of every non-empty channel.
    channels: HashMap<ChannelKey, HashSet<SessionId>>,
    /// Reverse index: channels each session has joined.
    memberships: HashMap<SessionId, HashSet<ChannelKey>>,
}

impl RegistryState {
    fn remove_session(&mut self, session: &SessionId) -> bool {
        let connected = self.sessions.remove(session).is_some();
        for key in self.memberships.remove(session).unwrap_or_default() {
            if let Some(members) = self.channels.get_mut(&key) {
                members.remove(session);
                if members.is_empty() {
                    self.channels.remove(&key);
                }
            }
        }
        connected
    }
}

/// Registry of channel memberships for connected sessions.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ChannelRegistry {
    /// Create a registry. It rejects connections until [`init`](Self::init).
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the registry for connections.
    pub fn init(&self) {
        let mut state = self.state.write();
        if !state.open {
            state.open = true;
            info!("Channel registry initialized");
        }
    }

    /// Close the registry: every session queue is dropped (receivers observe
    /// end of stream) and all membership is cleared.
    pub fn teardown(&self) {
        let mut state = self.state.write();
        let sessions = state.sessions.len();
        let channels = state.channels.len();
        state.open = false;
        state.sessions.clear();
        state.channels.clear();
        state.memberships.clear();
        info!(sessions, channels, "Channel registry torn down");
    }

    /// Whether the registry accepts connections.
    pub fn is_open(&self) -> bool {
        self.state.read().open
    }

    /// Register a connected session and return its event stream.
    pub fn connect(&self, session: SessionId) -> RegistryResult<SessionEvents> {
        let mut state = self.state.write();
        if !state.open {
            return Err(RegistryError::Closed);
        }
        if state.sessions.contains_key(&session) {
            return Err(RegistryError::AlreadyConnected(session));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.sessions.insert(session.clone(), tx);
        debug!(session_id = %session, "Session connected");

        Ok(SessionEvents { session, rx })
    }

    /// Remove a session from every channel. Returns false if it was not
    /// connected.
    pub fn disconnect(&self, session: &SessionId) -> bool {
        let removed = self.state.write().remove_session(session);
        if removed {
            debug!(session_id = %session, "Session disconnected");
        }
        removed
    }

    /// Join a channel. Idempotent; returns true if membership changed.
    ///
    /// Sessions that are not connected cannot join.
    pub fn join(&self, session: &SessionId, key: ChannelKey) -> bool {
        let mut state = self.state.write();
        if !state.sessions.contains_key(session) {
            return false;
        }

        let joined = state
            .memberships
            .entry(session.clone())
            .or_default()
            .insert(key);
        if joined {
            state
                .channels
                .entry(key)
                .or_default()
                .insert(session.clone());
            debug!(session_id = %session, channel = %key, "Joined channel");
        }
        joined
    }

    /// Leave a channel. Silent no-op if not a member; returns true if
    /// membership changed.
    pub fn leave(&self, session: &SessionId, key: ChannelKey) -> bool {
        let mut state = self.state.write();
        let left = state
            .memberships
            .get_mut(session)
            .map(|keys| keys.remove(&key))
            .unwrap_or(false);
        if !left {
            return false;
        }

        if let Some(members) = state.channels.get_mut(&key) {
            members.remove(session);
            if members.is_empty() {
                state.channels.remove(&key);
            }
        }
        debug!(session_id = %session, channel = %key, "Left channel");
        true
    }

    /// Deliver an event to every current member of a channel.
    ///
    /// Never blocks and never waits for delivery. Members whose connection is
    /// gone are skipped and pruned. Returns the number of sessions the event
    /// was queued for.
    pub fn publish(&self, key: ChannelKey, payload: EventPayload) -> usize {
        let event = Event::new(key, payload);
        let mut delivered = 0;
        let mut dead = Vec::new();

        {
            let state = self.state.read();
            let Some(members) = state.channels.get(&key) else {
                debug!(channel = %key, kind = event.event.name(), "Published to empty channel");
                return 0;
            };

            for session in members {
                match state.sessions.get(session) {
                    Some(tx) if tx.send(event.clone()).is_ok() => delivered += 1,
                    _ => dead.push(session.clone()),
                }
            }
        }

        if !dead.is_empty() {
            let mut state = self.state.write();
            for session in &dead {
                let closed = state
                    .sessions
                    .get(session)
                    .map_or(true, |tx| tx.is_closed());
                if closed {
                    state.remove_session(session);
                }
            }
            warn!(channel = %key, pruned = dead.len(), "Pruned disconnected sessions");
        }

        debug!(channel = %key, kind = event.event.name(), delivered, "Published event");
        delivered
    }

    /// Current members of a channel.
    pub fn members(&self, key: &ChannelKey) -> Vec<SessionId> {
        self.state
            .read()
            .channels
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Channels a session has joined.
    pub fn channels_of(&self, session: &SessionId) -> Vec<ChannelKey> {
        self.state
            .read()
            .memberships
            .get(session)
            .map(|keys| keys.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of channels with at least one member.
    pub fn channel_count(&self) -> usize {
        self.state.read().channels.len()
    }

    /// Number of connected sessions.
    pub fn session_count(&self) -> usize {
        self.state.read().sessions.len()
    }
}

/// Events queued for one connected session.
///
/// The stream ends when the session is disconnected or the registry is torn
/// down.
pub struct SessionEvents {
    session: SessionId,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl SessionEvents {
    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Drain every queued event.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
