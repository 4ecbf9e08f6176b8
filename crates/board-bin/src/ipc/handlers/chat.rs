//! Direct message handlers.

use board_ipc::{error_codes, IpcServer, Method, Request, Response, SessionContext};
use board_protocol_types::{ChatId, UserId};
use board_store::{BoardReader, BoardWriter};

use super::common::{
    id_param, identified, register_store_handler, store_error, str_param, to_value,
    HandlerResult,
};
use crate::app::AppState;

/// Register chat handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::ChatOpen, state.clone(), open).await;
    register_store_handler(server, Method::ChatList, state.clone(), list).await;
    register_store_handler(server, Method::MessageSend, state.clone(), send).await;
    register_store_handler(server, Method::MessageList, state, messages).await;
}

fn open(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let peer = UserId(id_param(req, "peer_id")?);

    let chat = state
        .board
        .open_chat(actor, peer)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &chat)
}

fn list(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let user = identified(ctx, req)?;
    let chats = state.board.chats(user).map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "chats": to_value(req, &chats)? }))
}

fn send(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let chat_id = ChatId(id_param(req, "chat_id")?);
    let content = str_param(req, "content")?;

    let message = state
        .board
        .send_message(actor, chat_id, content)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &message)
}

/// Messages of a chat. Only members may read them.
fn messages(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let user = identified(ctx, req)?;
    let chat_id = ChatId(id_param(req, "chat_id")?);

    let chat = state.board.chat(chat_id).map_err(|e| store_error(req, e))?;
    if !chat.has_member(user) {
        return Err(Response::error(
            &req.id,
            error_codes::FORBIDDEN,
            &format!("not a member of chat {}", chat_id),
        ));
    }

    let messages = state
        .board
        .messages(chat_id)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "messages": to_value(req, &messages)? }))
}
