//! Write inputs and outcomes.
//!
//! Canonical records live in `board-protocol-types`; these types only describe
//! what a caller asks the store to write.

use board_protocol_types::{CommentId, LikeState, PostId, PostKind};

/// Registration details for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub phone: String,
}

/// A new room or job listing.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub kind: PostKind,
    pub title: String,
    pub content: String,
    pub location: Option<String>,
}

/// Partial update of a post. `None` fields are left unchanged; an empty
/// `location` clears it.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
}

impl PostUpdate {
    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.location.is_none()
    }
}

/// A new comment, optionally replying to another comment on the same post.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

/// Outcome of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// Whether the caller likes the post after the toggle.
    pub liked: bool,
    /// Like count after the toggle.
    pub state: LikeState,
}
