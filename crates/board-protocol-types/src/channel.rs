//! Channel keys.
//!
//! A channel is a runtime routing group named after one entity instance (or
//! one global feed). Keys have a stable wire name: `posts`, `post-<id>`,
//! `chat-<id>`, `users`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::{ChatId, PostId};

/// Routing key of a broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    /// Global post feed.
    Posts,
    /// Comments, likes and bookmarks of one post.
    Post(PostId),
    /// Messages of one chat.
    Chat(ChatId),
    /// Presence of all users.
    Users,
}

/// Error parsing a channel wire name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel: {0}")]
pub struct ChannelKeyError(pub String);

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts => write!(f, "posts"),
            Self::Post(id) => write!(f, "post-{}", id),
            Self::Chat(id) => write!(f, "chat-{}", id),
            Self::Users => write!(f, "users"),
        }
    }
}

impl FromStr for ChannelKey {
    type Err = ChannelKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChannelKeyError(s.to_string());
        match s {
            "posts" => return Ok(Self::Posts),
            "users" => return Ok(Self::Users),
            _ => {}
        }

        let (prefix, id) = s.split_once('-').ok_or_else(err)?;
        let id: i64 = id.parse().map_err(|_| err())?;
        match prefix {
            "post" => Ok(Self::Post(PostId(id))),
            "chat" => Ok(Self::Chat(ChatId(id))),
            _ => Err(err()),
        }
    }
}

impl Serialize for ChannelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
