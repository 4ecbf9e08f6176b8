//! Standalone query functions that work with any Connection.
//!
//! Each function takes a `&Connection` as its first parameter. Lookups return
//! `Ok(None)` for a missing row; the engine decides whether that is an error.

use board_protocol_types::{
    Chat, ChatId, ChatMessage, Comment, CommentId, MessageId, Post, PostId, PostKind, User,
    UserId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::StoreResult;

const POST_COLUMNS: &str =
    "id, user_id, kind, title, content, location, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, user_id, parent_id, content, created_at, updated_at";

/// Fixed-width timestamps so text ordering matches time ordering.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ==========================================
// Users
// ==========================================

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        phone: row.get(2)?,
        online: row.get(3)?,
        created_at: parse_datetime(row.get(4)?),
    })
}

pub fn insert_user(conn: &Connection, username: &str, phone: &str) -> StoreResult<UserId> {
    conn.execute(
        "INSERT INTO users (username, phone, online, created_at) VALUES (?1, ?2, 0, ?3)",
        params![username, phone, now()],
    )?;
    Ok(UserId(conn.last_insert_rowid()))
}

pub fn get_user(conn: &Connection, id: UserId) -> StoreResult<Option<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, username, phone, online, created_at FROM users WHERE id = ?1",
    )?;
    Ok(stmt.query_row(params![id.get()], user_from_row).optional()?)
}

pub fn username_taken(conn: &Connection, username: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM users WHERE username = ?1")?;
    Ok(stmt.exists(params![username])?)
}

/// Sets the online flag. Returns true if the stored value changed.
pub fn set_online(conn: &Connection, id: UserId, online: bool) -> StoreResult<bool> {
    let changed = conn.execute(
        "UPDATE users SET online = ?2 WHERE id = ?1 AND online != ?2",
        params![id.get(), online],
    )?;
    Ok(changed > 0)
}

pub fn reset_presence(conn: &Connection) -> StoreResult<usize> {
    Ok(conn.execute("UPDATE users SET online = 0 WHERE online != 0", [])?)
}

// ==========================================
// Posts
// ==========================================

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let kind: String = row.get(2)?;
    Ok(Post {
        id: PostId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        kind: PostKind::parse(&kind).unwrap_or(PostKind::Room),
        title: row.get(3)?,
        content: row.get(4)?,
        location: row.get(5)?,
        created_at: parse_datetime(row.get(6)?),
        updated_at: parse_datetime(row.get(7)?),
    })
}

pub fn insert_post(
    conn: &Connection,
    user_id: UserId,
    kind: PostKind,
    title: &str,
    content: &str,
    location: Option<&str>,
) -> StoreResult<PostId> {
    let now = now();
    conn.execute(
        "INSERT INTO posts (user_id, kind, title, content, location, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![user_id.get(), kind.as_str(), title, content, location, now],
    )?;
    Ok(PostId(conn.last_insert_rowid()))
}

pub fn get_post(conn: &Connection, id: PostId) -> StoreResult<Option<Post>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id.get()], post_from_row).optional()?)
}

/// Newest first.
pub fn list_posts(conn: &Connection, kind: Option<PostKind>) -> StoreResult<Vec<Post>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE ?1 IS NULL OR kind = ?1
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![kind.map(|k| k.as_str())], post_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn update_post(
    conn: &Connection,
    id: PostId,
    title: &str,
    content: &str,
    location: Option<&str>,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE posts SET title = ?2, content = ?3, location = ?4, updated_at = ?5 WHERE id = ?1",
        params![id.get(), title, content, location, now()],
    )?;
    Ok(())
}

pub fn delete_post(conn: &Connection, id: PostId) -> StoreResult<bool> {
    let deleted = conn.execute("DELETE FROM posts WHERE id = ?1", params![id.get()])?;
    Ok(deleted > 0)
}

// ==========================================
// Comments
// ==========================================

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.get(0)?),
        post_id: PostId(row.get(1)?),
        user_id: UserId(row.get(2)?),
        parent_id: row.get::<_, Option<i64>>(3)?.map(CommentId),
        content: row.get(4)?,
        created_at: parse_datetime(row.get(5)?),
        updated_at: parse_datetime(row.get(6)?),
    })
}

pub fn insert_comment(
    conn: &Connection,
    post_id: PostId,
    user_id: UserId,
    parent_id: Option<CommentId>,
    content: &str,
) -> StoreResult<CommentId> {
    let now = now();
    conn.execute(
        "INSERT INTO comments (post_id, user_id, parent_id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            post_id.get(),
            user_id.get(),
            parent_id.map(CommentId::get),
            content,
            now
        ],
    )?;
    Ok(CommentId(conn.last_insert_rowid()))
}

pub fn get_comment(conn: &Connection, id: CommentId) -> StoreResult<Option<Comment>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id.get()], comment_from_row).optional()?)
}

/// Oldest first.
pub fn list_comments(conn: &Connection, post_id: PostId) -> StoreResult<Vec<Comment>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![post_id.get()], comment_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn update_comment(conn: &Connection, id: CommentId, content: &str) -> StoreResult<()> {
    conn.execute(
        "UPDATE comments SET content = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.get(), content, now()],
    )?;
    Ok(())
}

pub fn delete_comment(conn: &Connection, id: CommentId) -> StoreResult<bool> {
    let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", params![id.get()])?;
    Ok(deleted > 0)
}

// ==========================================
// Likes and bookmarks
// ==========================================

pub fn has_like(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2")?;
    Ok(stmt.exists(params![post_id.get(), user_id.get()])?)
}

pub fn insert_like(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![post_id.get(), user_id.get(), now()],
    )?;
    Ok(())
}

pub fn delete_like(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
        params![post_id.get(), user_id.get()],
    )?;
    Ok(())
}

pub fn count_likes(conn: &Connection, post_id: PostId) -> StoreResult<i64> {
    let mut stmt = conn.prepare_cached("SELECT COUNT(*) FROM likes WHERE post_id = ?1")?;
    Ok(stmt.query_row(params![post_id.get()], |row| row.get(0))?)
}

pub fn has_bookmark(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM bookmarks WHERE post_id = ?1 AND user_id = ?2")?;
    Ok(stmt.exists(params![post_id.get(), user_id.get()])?)
}

pub fn insert_bookmark(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO bookmarks (post_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![post_id.get(), user_id.get(), now()],
    )?;
    Ok(())
}

pub fn delete_bookmark(conn: &Connection, post_id: PostId, user_id: UserId) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM bookmarks WHERE post_id = ?1 AND user_id = ?2",
        params![post_id.get(), user_id.get()],
    )?;
    Ok(())
}

/// Most recently bookmarked first.
pub fn list_bookmarked_posts(conn: &Connection, user_id: UserId) -> StoreResult<Vec<Post>> {
    let mut stmt = conn.prepare_cached(
        "SELECT p.id, p.user_id, p.kind, p.title, p.content, p.location, p.created_at, p.updated_at
         FROM bookmarks b JOIN posts p ON p.id = b.post_id
         WHERE b.user_id = ?1
         ORDER BY b.created_at DESC, p.id DESC",
    )?;
    let rows = stmt.query_map(params![user_id.get()], post_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ==========================================
// Chats and messages
// ==========================================

fn chat_from_row(row: &Row<'_>) -> rusqlite::Result<Chat> {
    Ok(Chat {
        id: ChatId(row.get(0)?),
        members: vec![UserId(row.get(1)?), UserId(row.get(2)?)],
        created_at: parse_datetime(row.get(3)?),
    })
}

fn ordered(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn find_chat_between(conn: &Connection, a: UserId, b: UserId) -> StoreResult<Option<Chat>> {
    let (a, b) = ordered(a, b);
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_a, user_b, created_at FROM chats WHERE user_a = ?1 AND user_b = ?2",
    )?;
    Ok(stmt.query_row(params![a.get(), b.get()], chat_from_row).optional()?)
}

pub fn insert_chat(conn: &Connection, a: UserId, b: UserId) -> StoreResult<ChatId> {
    let (a, b) = ordered(a, b);
    conn.execute(
        "INSERT INTO chats (user_a, user_b, created_at) VALUES (?1, ?2, ?3)",
        params![a.get(), b.get(), now()],
    )?;
    Ok(ChatId(conn.last_insert_rowid()))
}

pub fn get_chat(conn: &Connection, id: ChatId) -> StoreResult<Option<Chat>> {
    let mut stmt =
        conn.prepare_cached("SELECT id, user_a, user_b, created_at FROM chats WHERE id = ?1")?;
    Ok(stmt.query_row(params![id.get()], chat_from_row).optional()?)
}

pub fn list_chats(conn: &Connection, user_id: UserId) -> StoreResult<Vec<Chat>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_a, user_b, created_at FROM chats
         WHERE user_a = ?1 OR user_b = ?1
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id.get()], chat_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: MessageId(row.get(0)?),
        chat_id: ChatId(row.get(1)?),
        sender_id: UserId(row.get(2)?),
        content: row.get(3)?,
        created_at: parse_datetime(row.get(4)?),
    })
}

pub fn insert_message(
    conn: &Connection,
    chat_id: ChatId,
    sender_id: UserId,
    content: &str,
) -> StoreResult<MessageId> {
    conn.execute(
        "INSERT INTO messages (chat_id, sender_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![chat_id.get(), sender_id.get(), content, now()],
    )?;
    Ok(MessageId(conn.last_insert_rowid()))
}

pub fn get_message(conn: &Connection, id: MessageId) -> StoreResult<Option<ChatMessage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, chat_id, sender_id, content, created_at FROM messages WHERE id = ?1",
    )?;
    Ok(stmt.query_row(params![id.get()], message_from_row).optional()?)
}

/// Oldest first.
pub fn list_messages(conn: &Connection, chat_id: ChatId) -> StoreResult<Vec<ChatMessage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, chat_id, sender_id, content, created_at FROM messages
         WHERE chat_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![chat_id.get()], message_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
