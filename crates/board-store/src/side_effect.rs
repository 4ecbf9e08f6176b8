//! Side-effect contracts for the board store.
//!
//! Side-effects are emitted after facts are committed to SQLite and carry the
//! canonical record as committed (or the primary key for deletions).
//!
//! - The store emits side-effects
//! - The sink decides what they mean
//! - Tests assert emission, not behavior
//! - Recovery emits nothing

use board_protocol_types::{
    BookmarkState, ChatMessage, Comment, CommentId, LikeState, Post, PostId, UserStatus,
};

/// A side-effect emitted by the store after committing a fact.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// A post was created.
    PostCreated(Post),
    /// A post was edited.
    PostUpdated(Post),
    /// A post and everything hanging off it was deleted.
    PostDeleted { post_id: PostId },
    /// A comment was created.
    CommentCreated(Comment),
    /// A comment was edited.
    CommentUpdated(Comment),
    /// A comment and its replies were deleted.
    CommentDeleted {
        comment_id: CommentId,
        post_id: PostId,
    },
    /// The like count of a post changed.
    LikesChanged(LikeState),
    /// A user's bookmark on a post changed.
    BookmarkChanged(BookmarkState),
    /// A message was sent in a chat.
    MessageSent(ChatMessage),
    /// A user went online or offline.
    PresenceChanged(UserStatus),
}

/// A sink that receives side-effects from the store.
///
/// Implementations decide how to handle side-effects (e.g., publish to
/// channels, log events).
pub trait SideEffectSink: Send + Sync {
    /// Emit a side-effect.
    ///
    /// This is called after the corresponding fact has been committed to
    /// SQLite, while the store's write lock is still held.
    fn emit(&self, effect: SideEffect);
}

/// A no-op sink that discards all side-effects.
#[derive(Debug, Default)]
pub struct NullSink;

impl SideEffectSink for NullSink {
    fn emit(&self, _effect: SideEffect) {}
}

/// A sink that records all side-effects for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    effects: std::sync::Mutex<Vec<SideEffect>>,
}

impl RecordingSink {
    /// Creates a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded side-effects.
    pub fn effects(&self) -> Vec<SideEffect> {
        self.effects.lock().expect("lock poisoned").clone()
    }

    /// Clears all recorded side-effects.
    pub fn clear(&self) {
        self.effects.lock().expect("lock poisoned").clear();
    }

    /// Returns the number of recorded side-effects.
    pub fn len(&self) -> usize {
        self.effects.lock().expect("lock poisoned").len()
    }

    /// Returns true if no side-effects have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SideEffectSink for RecordingSink {
    fn emit(&self, effect: SideEffect) {
        self.effects.lock().expect("lock poisoned").push(effect);
    }
}

impl<T: SideEffectSink + ?Sized> SideEffectSink for std::sync::Arc<T> {
    fn emit(&self, effect: SideEffect) {
        (**self).emit(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_protocol_types::UserId;

    #[test]
    fn recording_sink_records_effects() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.emit(SideEffect::PostDeleted {
            post_id: PostId(42),
        });
        sink.emit(SideEffect::PresenceChanged(UserStatus {
            user_id: UserId(1),
            online: true,
        }));

        assert_eq!(sink.len(), 2);
        let effects = sink.effects();
        assert_eq!(
            effects[0],
            SideEffect::PostDeleted {
                post_id: PostId(42)
            }
        );
        assert!(matches!(effects[1], SideEffect::PresenceChanged(_)));
    }

    #[test]
    fn recording_sink_clear() {
        let sink = RecordingSink::new();
        sink.emit(SideEffect::PostDeleted { post_id: PostId(1) });
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn shared_sink_forwards() {
        let sink = std::sync::Arc::new(RecordingSink::new());
        let shared = sink.clone();
        shared.emit(SideEffect::PostDeleted { post_id: PostId(1) });
        assert_eq!(sink.len(), 1);
    }
}
