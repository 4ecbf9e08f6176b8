//! Broadcast events.
//!
//! Every event names the operation (`kind`) and carries the post-mutation
//! canonical record, or the primary key for deletions. The set of kinds is
//! closed: consumers match exhaustively.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelKey;
use crate::ids::{CommentId, PostId};
use crate::records::{BookmarkState, ChatMessage, Comment, LikeState, Post, UserStatus};

/// Event payload, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum EventPayload {
    NewPost(Post),
    PostUpdated(Post),
    PostDeleted(PostId),
    NewComment(Comment),
    CommentUpdated(Comment),
    CommentDeleted { id: CommentId, post_id: PostId },
    BookmarkUpdated(BookmarkState),
    LikesUpdated(LikeState),
    NewMessage(ChatMessage),
    UserStatusChange(UserStatus),
}

impl EventPayload {
    /// Wire name of the event kind (e.g. `new-comment`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewPost(_) => "new-post",
            Self::PostUpdated(_) => "post-updated",
            Self::PostDeleted(_) => "post-deleted",
            Self::NewComment(_) => "new-comment",
            Self::CommentUpdated(_) => "comment-updated",
            Self::CommentDeleted { .. } => "comment-deleted",
            Self::BookmarkUpdated(_) => "bookmark-updated",
            Self::LikesUpdated(_) => "likes-updated",
            Self::NewMessage(_) => "new-message",
            Self::UserStatusChange(_) => "user-status-change",
        }
    }
}

/// A payload addressed to one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub channel: ChannelKey,
    pub event: EventPayload,
}

impl Event {
    pub fn new(channel: ChannelKey, event: EventPayload) -> Self {
        Self { channel, event }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
