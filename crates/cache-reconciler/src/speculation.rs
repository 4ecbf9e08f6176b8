//! Optimistic slot updates.
//!
//! A session that initiates a mutation may show the expected result before
//! the server answers. [`Speculation`] holds the slot value from before the
//! speculative write: confirming discards it, rolling back writes it back.

use crate::cache::ClientCache;
use crate::query_key::QueryKey;

/// Value held by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotValue {
    Likes(i64),
    Bookmarked(bool),
}

/// A speculative write to a cache slot, pending the server's answer.
#[must_use = "a speculation must be confirmed or rolled back"]
#[derive(Debug)]
pub struct Speculation {
    key: QueryKey,
    previous: Option<SlotValue>,
}

impl Speculation {
    pub(crate) fn new(key: QueryKey, previous: Option<SlotValue>) -> Self {
        Self { key, previous }
    }

    /// Slot the speculation wrote to.
    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// The server accepted the mutation; keep the current slot value.
    ///
    /// The canonical value arrives through the response or the broadcast and
    /// overwrites the slot either way.
    pub fn confirm(self) {
        tracing::trace!(key = %self.key, "speculation confirmed");
    }

    /// The server rejected the mutation; restore the slot as it was.
    pub fn rollback(self, cache: &mut ClientCache) {
        tracing::debug!(key = %self.key, "speculation rolled back");
        cache.restore_slot(self.key, self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_protocol_types::{
        BookmarkState, ChannelKey, Event, EventPayload, LikeState, PostId, UserId,
    };

    const POST: PostId = PostId(42);
    const ALICE: UserId = UserId(1);

    fn bookmarked(value: bool) -> BookmarkState {
        BookmarkState {
            post_id: POST,
            user_id: ALICE,
            bookmarked: value,
        }
    }

    fn broadcast(value: bool) -> Event {
        Event::new(
            ChannelKey::Post(POST),
            EventPayload::BookmarkUpdated(bookmarked(value)),
        )
    }

    #[test]
    fn rollback_restores_previous_value() {
        let mut cache = ClientCache::new();
        cache.set_bookmark(bookmarked(false));

        let speculation = cache.speculate_bookmark(POST, ALICE, true);
        assert_eq!(cache.bookmarked(POST, ALICE), Some(true));

        speculation.rollback(&mut cache);
        assert_eq!(cache.bookmarked(POST, ALICE), Some(false));
    }

    #[test]
    fn rollback_of_unloaded_slot_clears_it() {
        let mut cache = ClientCache::new();

        let speculation = cache.speculate_likes(POST, 1);
        assert_eq!(speculation.key(), QueryKey::Likes(POST));
        speculation.rollback(&mut cache);

        assert_eq!(cache.likes(POST), None);
    }

    #[test]
    fn confirm_keeps_current_value() {
        let mut cache = ClientCache::new();
        cache.set_likes(LikeState {
            post_id: POST,
            likes: 3,
        });

        let speculation = cache.speculate_likes(POST, 4);
        speculation.confirm();

        assert_eq!(cache.likes(POST), Some(4));
    }

    #[test]
    fn bookmark_race_response_then_broadcast() {
        let mut cache = ClientCache::new();
        cache.set_bookmark(bookmarked(false));

        let speculation = cache.speculate_bookmark(POST, ALICE, true);
        cache.set_bookmark(bookmarked(true));
        speculation.confirm();
        cache.apply(&broadcast(true));

        assert_eq!(cache.bookmarked(POST, ALICE), Some(true));
    }

    #[test]
    fn bookmark_race_broadcast_then_response() {
        let mut cache = ClientCache::new();
        cache.set_bookmark(bookmarked(false));

        let speculation = cache.speculate_bookmark(POST, ALICE, true);
        cache.apply(&broadcast(true));
        cache.set_bookmark(bookmarked(true));
        speculation.confirm();

        assert_eq!(cache.bookmarked(POST, ALICE), Some(true));
    }
}
