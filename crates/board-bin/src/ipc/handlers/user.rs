//! User registration and session identity.

use board_ipc::{IpcServer, Method, Request, SessionContext};
use board_protocol_types::{ChannelKey, UserId};
use board_store::{BoardReader, BoardWriter, NewUser};
use tracing::{debug, info, warn};

use super::common::{id_param, register_store_handler, store_error, str_param, to_value, HandlerResult};
use crate::app::AppState;

/// Register user handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::UserRegister, state.clone(), register_user).await;
    register_store_handler(server, Method::SessionIdentify, state, identify).await;
}

fn register_user(state: &AppState, _ctx: &SessionContext, req: &Request) -> HandlerResult {
    let user = NewUser {
        username: str_param(req, "username")?.to_string(),
        phone: str_param(req, "phone")?.to_string(),
    };
    let user = state
        .board
        .register_user(user)
        .map_err(|e| store_error(req, e))?;
    info!(user_id = %user.id, "User registered");
    to_value(req, &user)
}

/// Bind the session to a user and mark the user online.
///
/// Re-identifying as another user releases the previous one and leaves the
/// chat channels the new user is not a member of.
fn identify(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let user_id = UserId(id_param(req, "user_id")?);
    let previous = ctx.user();

    if previous != Some(user_id) {
        state
            .presence
            .attach(state.board.as_ref(), user_id)
            .map_err(|e| store_error(req, e))?;
        ctx.identify(user_id);
        if let Some(previous) = previous {
            release(state, previous);
            leave_foreign_chats(state, ctx, user_id);
        }
        info!(
            session_id = %ctx.session_id(),
            user_id = %user_id,
            sessions = state.presence.sessions_of(user_id),
            "Session identified"
        );
    }

    let user = state.board.user(user_id).map_err(|e| store_error(req, e))?;
    to_value(req, &user)
}

fn leave_foreign_chats(state: &AppState, ctx: &SessionContext, user: UserId) {
    for channel in ctx.channels() {
        let ChannelKey::Chat(chat_id) = channel else {
            continue;
        };
        // A chat that can no longer be read is left as well.
        let member = state
            .board
            .chat(chat_id)
            .map(|chat| chat.has_member(user))
            .unwrap_or(false);
        if !member {
            ctx.leave(channel);
            debug!(session_id = %ctx.session_id(), channel = %channel, "Left chat after identity change");
        }
    }
}

/// Drop one session of `user` from presence.
pub(crate) fn release(state: &AppState, user: UserId) {
    if let Err(e) = state.presence.detach(state.board.as_ref(), user) {
        warn!(user_id = %user, error = %e, "Failed to update presence");
    }
}
