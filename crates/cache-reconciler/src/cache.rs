//! The client cache and its merge rules.

use std::collections::HashMap;

use board_protocol_types::{
    BookmarkState, ChatId, ChatMessage, Comment, Event, EventPayload, LikeState, Post, PostId,
    UserId, UserStatus,
};
use tracing::trace;

use crate::collection::CachedCollection;
use crate::query_key::QueryKey;
use crate::speculation::{SlotValue, Speculation};

/// What merging an event did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A record was appended to a collection.
    Inserted,
    /// A present record was replaced.
    Replaced,
    /// A present record was removed.
    Removed,
    /// A value slot was written.
    Overwritten,
    /// Nothing changed: duplicate create, update or delete of an absent key,
    /// or a collection this session has not loaded.
    Ignored,
}

/// Query results a session has loaded, keyed by [`QueryKey`].
///
/// Collections exist only once loaded with a `replace_*` call; events for
/// collections that were never loaded are ignored. Slots are plain values and
/// are written by any status event.
#[derive(Debug, Default)]
pub struct ClientCache {
    posts: Option<CachedCollection<Post>>,
    comments: HashMap<PostId, CachedCollection<Comment>>,
    messages: HashMap<ChatId, CachedCollection<ChatMessage>>,
    likes: HashMap<PostId, i64>,
    bookmarks: HashMap<(PostId, UserId), bool>,
    statuses: HashMap<UserId, bool>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn posts(&self) -> Option<&CachedCollection<Post>> {
        self.posts.as_ref()
    }

    pub fn comments(&self, post: PostId) -> Option<&CachedCollection<Comment>> {
        self.comments.get(&post)
    }

    pub fn messages(&self, chat: ChatId) -> Option<&CachedCollection<ChatMessage>> {
        self.messages.get(&chat)
    }

    pub fn likes(&self, post: PostId) -> Option<i64> {
        self.likes.get(&post).copied()
    }

    pub fn bookmarked(&self, post: PostId, user: UserId) -> Option<bool> {
        self.bookmarks.get(&(post, user)).copied()
    }

    pub fn online(&self, user: UserId) -> Option<bool> {
        self.statuses.get(&user).copied()
    }

    /// Whether the query result is present in the cache.
    pub fn is_loaded(&self, key: &QueryKey) -> bool {
        match key {
            QueryKey::Posts => self.posts.is_some(),
            QueryKey::Comments(post) => self.comments.contains_key(post),
            QueryKey::Messages(chat) => self.messages.contains_key(chat),
            QueryKey::Likes(post) => self.likes.contains_key(post),
            QueryKey::Bookmark(post, user) => self.bookmarks.contains_key(&(*post, *user)),
            QueryKey::Status(user) => self.statuses.contains_key(user),
        }
    }

    // ========================================================================
    // Full replace (fetch and refetch)
    // ========================================================================

    pub fn replace_posts(&mut self, posts: impl IntoIterator<Item = Post>) {
        self.posts = Some(CachedCollection::from_records(posts));
    }

    pub fn replace_comments(&mut self, post: PostId, comments: impl IntoIterator<Item = Comment>) {
        self.comments
            .insert(post, CachedCollection::from_records(comments));
    }

    pub fn replace_messages(
        &mut self,
        chat: ChatId,
        messages: impl IntoIterator<Item = ChatMessage>,
    ) {
        self.messages
            .insert(chat, CachedCollection::from_records(messages));
    }

    pub fn set_likes(&mut self, state: LikeState) {
        self.likes.insert(state.post_id, state.likes);
    }

    pub fn set_bookmark(&mut self, state: BookmarkState) {
        self.bookmarks
            .insert((state.post_id, state.user_id), state.bookmarked);
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.statuses.insert(status.user_id, status.online);
    }

    /// Drop one query result; the next read refetches it.
    pub fn invalidate(&mut self, key: &QueryKey) {
        match key {
            QueryKey::Posts => self.posts = None,
            QueryKey::Comments(post) => {
                self.comments.remove(post);
            }
            QueryKey::Messages(chat) => {
                self.messages.remove(chat);
            }
            QueryKey::Likes(post) => {
                self.likes.remove(post);
            }
            QueryKey::Bookmark(post, user) => {
                self.bookmarks.remove(&(*post, *user));
            }
            QueryKey::Status(user) => {
                self.statuses.remove(user);
            }
        }
    }

    /// Drop everything. Used after a reconnect, since missed events are
    /// never replayed.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ========================================================================
    // Direct responses to this session's own mutations
    // ========================================================================

    /// Merge a post returned by `post.create` or `post.update`.
    pub fn accept_post(&mut self, post: Post) {
        if let Some(posts) = self.posts.as_mut() {
            posts.upsert(post);
        }
    }

    /// Merge a comment returned by `comment.create` or `comment.update`.
    pub fn accept_comment(&mut self, comment: Comment) {
        if let Some(comments) = self.comments.get_mut(&comment.post_id) {
            comments.upsert(comment);
        }
    }

    /// Merge a message returned by `message.send`.
    pub fn accept_message(&mut self, message: ChatMessage) {
        if let Some(messages) = self.messages.get_mut(&message.chat_id) {
            messages.upsert(message);
        }
    }

    // ========================================================================
    // Broadcast events
    // ========================================================================

    /// Merge one broadcast event.
    pub fn apply(&mut self, event: &Event) -> MergeOutcome {
        let outcome = self.merge(&event.event);
        trace!(
            channel = %event.channel,
            kind = event.event.name(),
            ?outcome,
            "merged event"
        );
        outcome
    }

    fn merge(&mut self, payload: &EventPayload) -> MergeOutcome {
        match payload {
            EventPayload::NewPost(post) => match self.posts.as_mut() {
                Some(posts) => inserted(posts.insert_if_absent(post.clone())),
                None => MergeOutcome::Ignored,
            },
            EventPayload::PostUpdated(post) => match self.posts.as_mut() {
                Some(posts) => replaced(posts.replace(post.clone())),
                None => MergeOutcome::Ignored,
            },
            EventPayload::PostDeleted(post_id) => self.remove_post(*post_id),

            EventPayload::NewComment(comment) => match self.comments.get_mut(&comment.post_id) {
                Some(comments) => inserted(comments.insert_if_absent(comment.clone())),
                None => MergeOutcome::Ignored,
            },
            EventPayload::CommentUpdated(comment) => {
                match self.comments.get_mut(&comment.post_id) {
                    Some(comments) => replaced(comments.replace(comment.clone())),
                    None => MergeOutcome::Ignored,
                }
            }
            EventPayload::CommentDeleted { id, post_id } => match self.comments.get_mut(post_id) {
                Some(comments) => removed(comments.remove_thread(*id) > 0),
                None => MergeOutcome::Ignored,
            },

            EventPayload::NewMessage(message) => match self.messages.get_mut(&message.chat_id) {
                Some(messages) => inserted(messages.insert_if_absent(message.clone())),
                None => MergeOutcome::Ignored,
            },

            EventPayload::LikesUpdated(state) => {
                self.set_likes(*state);
                MergeOutcome::Overwritten
            }
            EventPayload::BookmarkUpdated(state) => {
                self.set_bookmark(*state);
                MergeOutcome::Overwritten
            }
            EventPayload::UserStatusChange(status) => {
                self.set_status(*status);
                MergeOutcome::Overwritten
            }
        }
    }

    /// Remove a post and every cached result hanging off it.
    fn remove_post(&mut self, post_id: PostId) -> MergeOutcome {
        self.comments.remove(&post_id);
        self.likes.remove(&post_id);
        self.bookmarks.retain(|(post, _), _| *post != post_id);

        match self.posts.as_mut().and_then(|posts| posts.remove(post_id)) {
            Some(_) => MergeOutcome::Removed,
            None => MergeOutcome::Ignored,
        }
    }

    // ========================================================================
    // Speculation
    // ========================================================================

    /// Show a like count before the server confirms it.
    pub fn speculate_likes(&mut self, post: PostId, likes: i64) -> Speculation {
        let previous = self.likes.insert(post, likes).map(SlotValue::Likes);
        Speculation::new(QueryKey::Likes(post), previous)
    }

    /// Show a bookmark state before the server confirms it.
    pub fn speculate_bookmark(&mut self, post: PostId, user: UserId, bookmarked: bool) -> Speculation {
        let previous = self
            .bookmarks
            .insert((post, user), bookmarked)
            .map(SlotValue::Bookmarked);
        Speculation::new(QueryKey::Bookmark(post, user), previous)
    }

    pub(crate) fn restore_slot(&mut self, key: QueryKey, previous: Option<SlotValue>) {
        match (key, previous) {
            (QueryKey::Likes(post), Some(SlotValue::Likes(likes))) => {
                self.likes.insert(post, likes);
            }
            (QueryKey::Bookmark(post, user), Some(SlotValue::Bookmarked(bookmarked))) => {
                self.bookmarks.insert((post, user), bookmarked);
            }
            (key, None) => self.invalidate(&key),
            (key, Some(value)) => {
                tracing::warn!(%key, ?value, "slot value does not match key, invalidating");
                self.invalidate(&key);
            }
        }
    }
}

fn inserted(changed: bool) -> MergeOutcome {
    if changed {
        MergeOutcome::Inserted
    } else {
        MergeOutcome::Ignored
    }
}

fn removed(changed: bool) -> MergeOutcome {
    if changed {
        MergeOutcome::Removed
    } else {
        MergeOutcome::Ignored
    }
}

fn replaced(changed: bool) -> MergeOutcome {
    if changed {
        MergeOutcome::Replaced
    } else {
        MergeOutcome::Ignored
    }
}
