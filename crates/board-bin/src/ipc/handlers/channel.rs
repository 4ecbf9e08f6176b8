//! Channel membership handlers.

use board_ipc::{error_codes, IpcServer, Method, Request, Response, SessionContext};
use board_protocol_types::ChannelKey;
use board_store::BoardReader;
use tracing::debug;

use super::common::{identified, invalid_params, register_store_handler, store_error, str_param, HandlerResult};
use crate::app::AppState;

/// Register channel handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::ChannelJoin, state.clone(), join).await;
    register_store_handler(server, Method::ChannelLeave, state, leave).await;
}

fn channel_param(req: &Request) -> Result<ChannelKey, Response> {
    str_param(req, "channel")?
        .parse()
        .map_err(|e: board_protocol_types::ChannelKeyError| invalid_params(req, &e.to_string()))
}

/// Join a channel. Chat channels are open to the chat's members only.
fn join(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let channel = channel_param(req)?;

    if let ChannelKey::Chat(chat_id) = channel {
        let user = identified(ctx, req)?;
        let chat = state.board.chat(chat_id).map_err(|e| store_error(req, e))?;
        if !chat.has_member(user) {
            return Err(Response::error(
                &req.id,
                error_codes::FORBIDDEN,
                &format!("not a member of chat {}", chat_id),
            ));
        }
    }

    let joined = ctx.join(channel);
    debug!(session_id = %ctx.session_id(), channel = %channel, joined, "Channel join");
    Ok(serde_json::json!({ "channel": channel, "joined": joined }))
}

fn leave(_state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let channel = channel_param(req)?;
    let left = ctx.leave(channel);
    debug!(session_id = %ctx.session_id(), channel = %channel, left, "Channel leave");
    Ok(serde_json::json!({ "channel": channel, "left": left }))
}
