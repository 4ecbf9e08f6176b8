//! Wire types shared by the roomboard server, its clients and the client cache.
//!
//! - [`ids`] - Integer primary-key newtypes
//! - [`records`] - Canonical records returned by the store
//! - [`channel`] - Channel keys that route broadcast events
//! - [`event`] - The closed set of broadcast events
//! - [`protocol`] - Request/response framing over NDJSON

mod channel;
mod event;
mod ids;
mod protocol;
mod records;

pub use channel::{ChannelKey, ChannelKeyError};
pub use event::{Event, EventPayload};
pub use ids::{ChatId, CommentId, MessageId, PostId, SessionId, UserId};
pub use protocol::{error_codes, ErrorInfo, Frame, Method, Request, Response};
pub use records::{
    BookmarkState, Chat, ChatMessage, Comment, LikeState, Post, PostKind, User, UserStatus,
};
