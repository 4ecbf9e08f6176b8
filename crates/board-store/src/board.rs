//! The board engine.
//!
//! Coordinates SQLite storage and side-effects.
//!
//! # Write Path (strict order)
//!
//! 1. Validate input, authorize the actor
//! 2. Commit fact to SQLite
//! 3. Emit side-effect
//!
//! If step 1 or 2 fails, nothing else runs. Side-effects are emitted while the
//! connection lock is held, so they are observed in commit order.
//!
//! # Recovery (silent)
//!
//! On startup every user is marked offline: no session survives a restart.
//! Recovery emits NO side-effects.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use board_protocol_types::{
    BookmarkState, Chat, ChatId, ChatMessage, Comment, CommentId, LikeState, Post, PostId,
    PostKind, User, UserId, UserStatus,
};
use rusqlite::Connection;

use crate::migrations;
use crate::queries;
use crate::reader::BoardReader;
use crate::side_effect::{SideEffect, SideEffectSink};
use crate::types::{LikeToggle, NewComment, NewPost, NewUser, PostUpdate};
use crate::validation;
use crate::writer::BoardWriter;
use crate::{StoreError, StoreResult};

/// The board store.
pub struct Board<S: SideEffectSink> {
    conn: Mutex<Connection>,
    sink: S,
}

impl<S: SideEffectSink> Board<S> {
    /// Opens the store with a SQLite database at the given path.
    ///
    /// Creates the schema if needed and performs recovery. No side-effects are
    /// emitted during recovery.
    pub fn open(path: impl AsRef<Path>, sink: S) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;
        Self::from_connection(conn, sink)
    }

    /// Creates the store over an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn in_memory(sink: S) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn, sink)
    }

    fn from_connection(conn: Connection, sink: S) -> StoreResult<Self> {
        migrations::run_migrations(&conn)?;

        let board = Self {
            conn: Mutex::new(conn),
            sink,
        };
        board.recover()?;
        Ok(board)
    }

    fn recover(&self) -> StoreResult<()> {
        let conn = self.lock();
        let reset = queries::reset_presence(&conn)?;
        tracing::info!(users_reset = reset, "board: recovery complete");
        Ok(())
    }

    /// Returns a reference to the side-effect sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("lock poisoned")
    }
}

fn require_user(conn: &Connection, id: UserId) -> StoreResult<User> {
    queries::get_user(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("user {id}")))
}

fn require_post(conn: &Connection, id: PostId) -> StoreResult<Post> {
    queries::get_post(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("post {id}")))
}

fn require_comment(conn: &Connection, id: CommentId) -> StoreResult<Comment> {
    queries::get_comment(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("comment {id}")))
}

fn require_chat(conn: &Connection, id: ChatId) -> StoreResult<Chat> {
    queries::get_chat(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("chat {id}")))
}

impl<S: SideEffectSink> BoardWriter for Board<S> {
    // ========================================================================
    // Users
    // ========================================================================

    fn register_user(&self, user: NewUser) -> StoreResult<User> {
        let username = validation::username(&user.username)?;
        let phone = validation::phone(&user.phone)?;

        let conn = self.lock();
        if queries::username_taken(&conn, &username)? {
            return Err(StoreError::Conflict(format!(
                "username {username} is taken"
            )));
        }
        let id = queries::insert_user(&conn, &username, &phone)?;
        tracing::debug!(user_id = %id, "board: user registered");
        require_user(&conn, id)
    }

    fn set_online(&self, user: UserId, online: bool) -> StoreResult<UserStatus> {
        let conn = self.lock();
        require_user(&conn, user)?;

        let status = UserStatus {
            user_id: user,
            online,
        };
        if queries::set_online(&conn, user, online)? {
            tracing::debug!(user_id = %user, online, "board: presence changed");
            self.sink.emit(SideEffect::PresenceChanged(status));
        }
        Ok(status)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    fn create_post(&self, actor: UserId, post: NewPost) -> StoreResult<Post> {
        let title = validation::title(&post.title)?;
        let content = validation::post_content(&post.content)?;
        let location = validation::location(post.location.as_deref());

        let conn = self.lock();
        require_user(&conn, actor)?;
        let id = queries::insert_post(
            &conn,
            actor,
            post.kind,
            &title,
            &content,
            location.as_deref(),
        )?;
        let post = require_post(&conn, id)?;

        self.sink.emit(SideEffect::PostCreated(post.clone()));
        Ok(post)
    }

    fn update_post(&self, actor: UserId, id: PostId, update: PostUpdate) -> StoreResult<Post> {
        if update.is_empty() {
            return Err(StoreError::Validation("nothing to update".to_string()));
        }
        let title = update.title.as_deref().map(validation::title).transpose()?;
        let content = update
            .content
            .as_deref()
            .map(validation::post_content)
            .transpose()?;

        let conn = self.lock();
        let current = require_post(&conn, id)?;
        if current.user_id != actor {
            return Err(StoreError::Forbidden(format!("post {id} belongs to another user")));
        }

        let location = match update.location.as_deref() {
            Some(location) => validation::location(Some(location)),
            None => current.location,
        };
        queries::update_post(
            &conn,
            id,
            title.as_deref().unwrap_or(&current.title),
            content.as_deref().unwrap_or(&current.content),
            location.as_deref(),
        )?;
        let post = require_post(&conn, id)?;

        self.sink.emit(SideEffect::PostUpdated(post.clone()));
        Ok(post)
    }

    fn delete_post(&self, actor: UserId, id: PostId) -> StoreResult<()> {
        let conn = self.lock();
        let current = require_post(&conn, id)?;
        if current.user_id != actor {
            return Err(StoreError::Forbidden(format!("post {id} belongs to another user")));
        }

        if queries::delete_post(&conn, id)? {
            self.sink.emit(SideEffect::PostDeleted { post_id: id });
        }
        Ok(())
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn create_comment(&self, actor: UserId, comment: NewComment) -> StoreResult<Comment> {
        let content = validation::comment(&comment.content)?;

        let conn = self.lock();
        require_user(&conn, actor)?;
        require_post(&conn, comment.post_id)?;
        if let Some(parent_id) = comment.parent_id {
            let parent = require_comment(&conn, parent_id)?;
            if parent.post_id != comment.post_id {
                return Err(StoreError::Validation(format!(
                    "comment {parent_id} belongs to another post"
                )));
            }
        }

        let id = queries::insert_comment(
            &conn,
            comment.post_id,
            actor,
            comment.parent_id,
            &content,
        )?;
        let comment = require_comment(&conn, id)?;

        self.sink.emit(SideEffect::CommentCreated(comment.clone()));
        Ok(comment)
    }

    fn update_comment(
        &self,
        actor: UserId,
        id: CommentId,
        content: &str,
    ) -> StoreResult<Comment> {
        let content = validation::comment(content)?;

        let conn = self.lock();
        let current = require_comment(&conn, id)?;
        if current.user_id != actor {
            return Err(StoreError::Forbidden(format!(
                "comment {id} belongs to another user"
            )));
        }

        queries::update_comment(&conn, id, &content)?;
        let comment = require_comment(&conn, id)?;

        self.sink.emit(SideEffect::CommentUpdated(comment.clone()));
        Ok(comment)
    }

    fn delete_comment(&self, actor: UserId, id: CommentId) -> StoreResult<Comment> {
        let conn = self.lock();
        let current = require_comment(&conn, id)?;
        if current.user_id != actor {
            return Err(StoreError::Forbidden(format!(
                "comment {id} belongs to another user"
            )));
        }

        if queries::delete_comment(&conn, id)? {
            self.sink.emit(SideEffect::CommentDeleted {
                comment_id: id,
                post_id: current.post_id,
            });
        }
        Ok(current)
    }

    // ========================================================================
    // Reactions
    // ========================================================================

    fn toggle_like(&self, actor: UserId, post: PostId) -> StoreResult<LikeToggle> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        require_user(&tx, actor)?;
        require_post(&tx, post)?;

        let liked = if queries::has_like(&tx, post, actor)? {
            queries::delete_like(&tx, post, actor)?;
            false
        } else {
            queries::insert_like(&tx, post, actor)?;
            true
        };
        let state = LikeState {
            post_id: post,
            likes: queries::count_likes(&tx, post)?,
        };
        tx.commit()?;

        self.sink.emit(SideEffect::LikesChanged(state));
        Ok(LikeToggle { liked, state })
    }

    fn toggle_bookmark(&self, actor: UserId, post: PostId) -> StoreResult<BookmarkState> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        require_user(&tx, actor)?;
        require_post(&tx, post)?;

        let bookmarked = if queries::has_bookmark(&tx, post, actor)? {
            queries::delete_bookmark(&tx, post, actor)?;
            false
        } else {
            queries::insert_bookmark(&tx, post, actor)?;
            true
        };
        tx.commit()?;

        let state = BookmarkState {
            post_id: post,
            user_id: actor,
            bookmarked,
        };
        self.sink.emit(SideEffect::BookmarkChanged(state));
        Ok(state)
    }

    // ========================================================================
    // Direct messages
    // ========================================================================

    fn open_chat(&self, actor: UserId, peer: UserId) -> StoreResult<Chat> {
        if actor == peer {
            return Err(StoreError::Validation(
                "cannot open a chat with yourself".to_string(),
            ));
        }

        let conn = self.lock();
        require_user(&conn, actor)?;
        require_user(&conn, peer)?;
        if let Some(chat) = queries::find_chat_between(&conn, actor, peer)? {
            return Ok(chat);
        }

        let id = queries::insert_chat(&conn, actor, peer)?;
        tracing::debug!(chat_id = %id, "board: chat opened");
        require_chat(&conn, id)
    }

    fn send_message(
        &self,
        actor: UserId,
        chat: ChatId,
        content: &str,
    ) -> StoreResult<ChatMessage> {
        let content = validation::message(content)?;

        let conn = self.lock();
        let current = require_chat(&conn, chat)?;
        if !current.has_member(actor) {
            return Err(StoreError::Forbidden(format!("not a member of chat {chat}")));
        }

        let id = queries::insert_message(&conn, chat, actor, &content)?;
        let message = queries::get_message(&conn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))?;

        self.sink.emit(SideEffect::MessageSent(message.clone()));
        Ok(message)
    }
}

impl<S: SideEffectSink> BoardReader for Board<S> {
    fn user(&self, id: UserId) -> StoreResult<User> {
        require_user(&self.lock(), id)
    }

    fn post(&self, id: PostId) -> StoreResult<Post> {
        require_post(&self.lock(), id)
    }

    fn posts(&self, kind: Option<PostKind>) -> StoreResult<Vec<Post>> {
        queries::list_posts(&self.lock(), kind)
    }

    fn comments(&self, post: PostId) -> StoreResult<Vec<Comment>> {
        let conn = self.lock();
        require_post(&conn, post)?;
        queries::list_comments(&conn, post)
    }

    fn likes(&self, post: PostId) -> StoreResult<LikeState> {
        let conn = self.lock();
        require_post(&conn, post)?;
        Ok(LikeState {
            post_id: post,
            likes: queries::count_likes(&conn, post)?,
        })
    }

    fn bookmark(&self, post: PostId, user: UserId) -> StoreResult<BookmarkState> {
        let conn = self.lock();
        require_post(&conn, post)?;
        Ok(BookmarkState {
            post_id: post,
            user_id: user,
            bookmarked: queries::has_bookmark(&conn, post, user)?,
        })
    }

    fn bookmarked_posts(&self, user: UserId) -> StoreResult<Vec<Post>> {
        queries::list_bookmarked_posts(&self.lock(), user)
    }

    fn chat(&self, id: ChatId) -> StoreResult<Chat> {
        require_chat(&self.lock(), id)
    }

    fn chats(&self, user: UserId) -> StoreResult<Vec<Chat>> {
        queries::list_chats(&self.lock(), user)
    }

    fn messages(&self, chat: ChatId) -> StoreResult<Vec<ChatMessage>> {
        let conn = self.lock();
        require_chat(&conn, chat)?;
        queries::list_messages(&conn, chat)
    }
}
