//! Online status derived from connected sessions.
//!
//! A user is online while at least one session identified as that user is
//! connected. The session count lives in memory only; the store resets
//! everybody offline on startup.

use std::collections::HashMap;
use std::sync::Mutex;

use board_protocol_types::{UserId, UserStatus};
use board_store::{BoardWriter, StoreResult};
use tracing::debug;

/// Number of connected sessions per user.
#[derive(Debug, Default)]
pub struct Presence {
    sessions: Mutex<HashMap<UserId, usize>>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session identified as `user`. Marks the user online.
    ///
    /// The count only moves once the store accepted the write.
    pub fn attach<W: BoardWriter>(&self, board: &W, user: UserId) -> StoreResult<UserStatus> {
        let mut sessions = self.sessions.lock().expect("lock poisoned");
        let status = board.set_online(user, true)?;
        let count = sessions.entry(user).or_insert(0);
        *count += 1;
        debug!(user_id = %user, sessions = *count, "Session attached");
        Ok(status)
    }

    /// A session identified as `user` went away. Marks the user offline when
    /// it was the last one; returns the new status in that case.
    pub fn detach<W: BoardWriter>(
        &self,
        board: &W,
        user: UserId,
    ) -> StoreResult<Option<UserStatus>> {
        let mut sessions = self.sessions.lock().expect("lock poisoned");
        let Some(count) = sessions.get_mut(&user) else {
            return Ok(None);
        };
        *count -= 1;
        debug!(user_id = %user, sessions = *count, "Session detached");
        if *count > 0 {
            return Ok(None);
        }

        sessions.remove(&user);
        board.set_online(user, false).map(Some)
    }

    /// Number of connected sessions identified as `user`.
    pub fn sessions_of(&self, user: UserId) -> usize {
        self.sessions
            .lock()
            .expect("lock poisoned")
            .get(&user)
            .copied()
            .unwrap_or(0)
    }
}
