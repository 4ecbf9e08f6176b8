//! IPC protocol definitions.
//!
//! Uses a JSON-RPC-like protocol over a Unix domain socket, one JSON value
//! per line. Clients send [`Request`]s; the server answers with [`Frame`]s,
//! which are either a [`Response`] to a request or a pushed [`Event`].

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// IPC method types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    // Health
    Health,
    Shutdown,

    // Users and sessions
    #[serde(rename = "user.register")]
    UserRegister,
    #[serde(rename = "session.identify")]
    SessionIdentify,

    // Channel membership
    #[serde(rename = "channel.join")]
    ChannelJoin,
    #[serde(rename = "channel.leave")]
    ChannelLeave,

    // Posts
    #[serde(rename = "post.create")]
    PostCreate,
    #[serde(rename = "post.update")]
    PostUpdate,
    #[serde(rename = "post.delete")]
    PostDelete,
    #[serde(rename = "post.get")]
    PostGet,
    #[serde(rename = "post.list")]
    PostList,

    // Comments
    #[serde(rename = "comment.create")]
    CommentCreate,
    #[serde(rename = "comment.update")]
    CommentUpdate,
    #[serde(rename = "comment.delete")]
    CommentDelete,
    #[serde(rename = "comment.list")]
    CommentList,

    // Likes and bookmarks
    #[serde(rename = "like.toggle")]
    LikeToggle,
    #[serde(rename = "like.get")]
    LikeGet,
    #[serde(rename = "bookmark.toggle")]
    BookmarkToggle,
    #[serde(rename = "bookmark.list")]
    BookmarkList,

    // Direct messages
    #[serde(rename = "chat.open")]
    ChatOpen,
    #[serde(rename = "chat.list")]
    ChatList,
    #[serde(rename = "message.send")]
    MessageSend,
    #[serde(rename = "message.list")]
    MessageList,
}

/// IPC request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation.
    pub id: String,
    /// Method to invoke.
    pub method: Method,
    /// Method parameters (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    /// Create a new request with auto-generated ID.
    pub fn new(method: Method) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params: None,
        }
    }

    /// Create a new request with parameters.
    pub fn with_params(method: Method, params: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params: Some(params),
        }
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.as_ref().and_then(|p| p.get(name))
    }

    /// Look up a string parameter by name.
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(|v| v.as_str())
    }

    /// Look up an integer parameter by name.
    pub fn i64_param(&self, name: &str) -> Option<i64> {
        self.param(name).and_then(|v| v.as_i64())
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// IPC response message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Request ID for correlation.
    pub id: String,
    /// Result data (if successful).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error information (if failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Error information in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

impl Response {
    /// Create a successful response.
    pub fn success(id: &str, result: serde_json::Value) -> Self {
        Self {
            id: id.to_string(),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: &str, code: i32, message: &str) -> Self {
        Self {
            id: id.to_string(),
            result: None,
            error: Some(ErrorInfo {
                code,
                message: message.to_string(),
            }),
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Error code, if the response failed.
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }

    /// Decode the result into a typed value.
    pub fn result_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.result
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// One line written by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    /// Answer to a request, correlated by id.
    Response(Response),
    /// Event pushed to a channel member.
    Event(Event),
}

impl Frame {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// Standard error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const NOT_AUTHENTICATED: i32 = -32001;
    pub const NOT_FOUND: i32 = -32002;
    pub const CONFLICT: i32 = -32003;
    pub const FORBIDDEN: i32 = -32004;
}
