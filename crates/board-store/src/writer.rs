//! Write-side trait for the board store.
//!
//! All write operations follow the strict order:
//! 1. Validate input and authorize the caller
//! 2. Commit fact to SQLite
//! 3. Emit side-effect
//!
//! If step 1 or 2 fails, nothing is emitted.

use board_protocol_types::{
    BookmarkState, Chat, ChatId, ChatMessage, Comment, CommentId, Post, PostId, User, UserId,
    UserStatus,
};

use crate::types::{LikeToggle, NewComment, NewPost, NewUser, PostUpdate};
use crate::StoreResult;

/// A writer for board data. `actor` is the identified caller.
pub trait BoardWriter {
    // ========================================================================
    // Users
    // ========================================================================

    /// Registers a new user. Usernames are unique.
    fn register_user(&self, user: NewUser) -> StoreResult<User>;

    /// Sets a user's presence. Emits only when the stored value changes.
    fn set_online(&self, user: UserId, online: bool) -> StoreResult<UserStatus>;

    // ========================================================================
    // Posts
    // ========================================================================

    fn create_post(&self, actor: UserId, post: NewPost) -> StoreResult<Post>;

    /// Edits a post. Only its author may edit it.
    fn update_post(&self, actor: UserId, id: PostId, update: PostUpdate) -> StoreResult<Post>;

    /// Deletes a post with its comments, likes and bookmarks. Only its author
    /// may delete it.
    fn delete_post(&self, actor: UserId, id: PostId) -> StoreResult<()>;

    // ========================================================================
    // Comments
    // ========================================================================

    /// Adds a comment. A reply's parent must belong to the same post.
    fn create_comment(&self, actor: UserId, comment: NewComment) -> StoreResult<Comment>;

    /// Edits a comment. Only its author may edit it.
    fn update_comment(&self, actor: UserId, id: CommentId, content: &str)
        -> StoreResult<Comment>;

    /// Deletes a comment and its replies. Returns the deleted comment.
    fn delete_comment(&self, actor: UserId, id: CommentId) -> StoreResult<Comment>;

    // ========================================================================
    // Reactions
    // ========================================================================

    /// Likes the post if the actor has not, otherwise removes the like.
    fn toggle_like(&self, actor: UserId, post: PostId) -> StoreResult<LikeToggle>;

    /// Bookmarks the post if the actor has not, otherwise removes the bookmark.
    fn toggle_bookmark(&self, actor: UserId, post: PostId) -> StoreResult<BookmarkState>;

    // ========================================================================
    // Direct messages
    // ========================================================================

    /// Returns the chat between the two users, creating it on first use.
    fn open_chat(&self, actor: UserId, peer: UserId) -> StoreResult<Chat>;

    /// Sends a message. Only chat members may send.
    fn send_message(&self, actor: UserId, chat: ChatId, content: &str)
        -> StoreResult<ChatMessage>;
}
