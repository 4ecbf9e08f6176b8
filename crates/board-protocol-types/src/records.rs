//! Canonical records as persisted by the store and carried by events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChatId, CommentId, MessageId, PostId, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub phone: String,
    pub online: bool,
    pub created_at: DateTime<Utc>,
}

/// What a listing offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Room,
    Job,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Job => "job",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "room" => Some(Self::Room),
            "job" => Some(Self::Job),
            _ => None,
        }
    }
}

/// A room or job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub kind: PostKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a post. `parent_id` links replies into a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A direct-message conversation between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

/// A message inside a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Like count of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub post_id: PostId,
    pub likes: i64,
}

/// Whether one user has bookmarked one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkState {
    pub post_id: PostId,
    pub user_id: UserId,
    pub bookmarked: bool,
}

/// Presence of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub user_id: UserId,
    pub online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_kind_parse() {
        assert_eq!(PostKind::parse("room"), Some(PostKind::Room));
        assert_eq!(PostKind::parse("JOB"), Some(PostKind::Job));
        assert_eq!(PostKind::parse("car"), None);
        assert_eq!(PostKind::Room.as_str(), "room");
    }

    #[test]
    fn comment_without_parent_omits_field() {
        let comment = Comment {
            id: CommentId(7),
            post_id: PostId(42),
            user_id: UserId(1),
            parent_id: None,
            content: "hi".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["post_id"], 42);
        assert!(json.get("parent_id").is_none());
    }

    #[test]
    fn chat_membership() {
        let chat = Chat {
            id: ChatId(3),
            members: vec![UserId(1), UserId(2)],
            created_at: Utc::now(),
        };
        assert!(chat.has_member(UserId(2)));
        assert!(!chat.has_member(UserId(9)));
    }
}
