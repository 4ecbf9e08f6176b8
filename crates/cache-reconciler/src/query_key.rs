//! Addresses of cached query results.

use std::fmt;

use board_protocol_types::{ChatId, PostId, UserId};

/// Key of one cached query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The post feed.
    Posts,
    /// Comments of one post.
    Comments(PostId),
    /// Messages of one chat.
    Messages(ChatId),
    /// Like count of one post.
    Likes(PostId),
    /// Whether one user bookmarked one post.
    Bookmark(PostId, UserId),
    /// Presence of one user.
    Status(UserId),
}

impl QueryKey {
    /// Whether the key addresses a value slot rather than a collection.
    pub fn is_slot(&self) -> bool {
        matches!(self, Self::Likes(_) | Self::Bookmark(..) | Self::Status(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => write!(f, "posts"),
            Self::Comments(post) => write!(f, "comments:{post}"),
            Self::Messages(chat) => write!(f, "messages:{chat}"),
            Self::Likes(post) => write!(f, "likes:{post}"),
            Self::Bookmark(post, user) => write!(f, "bookmark:{post}:{user}"),
            Self::Status(user) => write!(f, "status:{user}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(QueryKey::Posts.to_string(), "posts");
        assert_eq!(QueryKey::Comments(PostId(42)).to_string(), "comments:42");
        assert_eq!(QueryKey::Messages(ChatId(3)).to_string(), "messages:3");
        assert_eq!(
            QueryKey::Bookmark(PostId(42), UserId(1)).to_string(),
            "bookmark:42:1"
        );
        assert!(QueryKey::Status(UserId(1)).is_slot());
        assert!(!QueryKey::Posts.is_slot());
    }
}
