//! Board adapter for server integration.
//!
//! This module bridges the store's side-effects to the channel registry: every
//! committed mutation becomes exactly one event on the channel of the entity
//! it touched.

use board_protocol_types::{ChannelKey, EventPayload};
use board_store::{SideEffect, SideEffectSink};
use channel_registry::ChannelRegistry;
use tracing::debug;

/// A side-effect sink that publishes store side-effects to channels.
///
/// Delivery is fire-and-forget: a publish that reaches nobody does not affect
/// the mutation that caused it.
#[derive(Clone)]
pub struct FanOutSink {
    registry: ChannelRegistry,
}

impl FanOutSink {
    pub fn new(registry: ChannelRegistry) -> Self {
        Self { registry }
    }

    /// Channel and payload for a side-effect.
    pub fn route(effect: SideEffect) -> (ChannelKey, EventPayload) {
        match effect {
            SideEffect::PostCreated(post) => (ChannelKey::Posts, EventPayload::NewPost(post)),
            SideEffect::PostUpdated(post) => (ChannelKey::Posts, EventPayload::PostUpdated(post)),
            SideEffect::PostDeleted { post_id } => {
                (ChannelKey::Posts, EventPayload::PostDeleted(post_id))
            }
            SideEffect::CommentCreated(comment) => (
                ChannelKey::Post(comment.post_id),
                EventPayload::NewComment(comment),
            ),
            SideEffect::CommentUpdated(comment) => (
                ChannelKey::Post(comment.post_id),
                EventPayload::CommentUpdated(comment),
            ),
            SideEffect::CommentDeleted {
                comment_id,
                post_id,
            } => (
                ChannelKey::Post(post_id),
                EventPayload::CommentDeleted {
                    id: comment_id,
                    post_id,
                },
            ),
            SideEffect::LikesChanged(state) => (
                ChannelKey::Post(state.post_id),
                EventPayload::LikesUpdated(state),
            ),
            SideEffect::BookmarkChanged(state) => (
                ChannelKey::Post(state.post_id),
                EventPayload::BookmarkUpdated(state),
            ),
            SideEffect::MessageSent(message) => (
                ChannelKey::Chat(message.chat_id),
                EventPayload::NewMessage(message),
            ),
            SideEffect::PresenceChanged(status) => {
                (ChannelKey::Users, EventPayload::UserStatusChange(status))
            }
        }
    }
}

impl std::fmt::Debug for FanOutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutSink").finish_non_exhaustive()
    }
}

impl SideEffectSink for FanOutSink {
    fn emit(&self, effect: SideEffect) {
        let (channel, payload) = Self::route(effect);
        let kind = payload.name();
        let delivered = self.registry.publish(channel, payload);
        debug!(channel = %channel, kind, delivered, "Published board event");
    }
}
