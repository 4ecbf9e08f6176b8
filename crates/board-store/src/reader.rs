//! Read-side trait for the board store.
//!
//! Reads never emit side-effects. Single-record lookups fail with
//! `StoreError::NotFound`.

use board_protocol_types::{
    BookmarkState, Chat, ChatId, ChatMessage, Comment, LikeState, Post, PostId, PostKind, User,
    UserId,
};

use crate::StoreResult;

/// A reader for board data.
pub trait BoardReader {
    fn user(&self, id: UserId) -> StoreResult<User>;

    fn post(&self, id: PostId) -> StoreResult<Post>;

    /// Posts newest first, optionally filtered by kind.
    fn posts(&self, kind: Option<PostKind>) -> StoreResult<Vec<Post>>;

    /// Comments of a post, oldest first.
    fn comments(&self, post: PostId) -> StoreResult<Vec<Comment>>;

    fn likes(&self, post: PostId) -> StoreResult<LikeState>;

    fn bookmark(&self, post: PostId, user: UserId) -> StoreResult<BookmarkState>;

    /// Posts the user bookmarked, most recent bookmark first.
    fn bookmarked_posts(&self, user: UserId) -> StoreResult<Vec<Post>>;

    fn chat(&self, id: ChatId) -> StoreResult<Chat>;

    fn chats(&self, user: UserId) -> StoreResult<Vec<Chat>>;

    /// Messages of a chat, oldest first.
    fn messages(&self, chat: ChatId) -> StoreResult<Vec<ChatMessage>>;
}
