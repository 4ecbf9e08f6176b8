//! Comment handlers.

use board_ipc::{IpcServer, Method, Request, SessionContext};
use board_protocol_types::{CommentId, PostId};
use board_store::{BoardReader, BoardWriter, NewComment};

use super::common::{
    id_param, identified, optional_id_param, register_store_handler, store_error, str_param,
    to_value, HandlerResult,
};
use crate::app::AppState;

/// Register comment handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::CommentCreate, state.clone(), create).await;
    register_store_handler(server, Method::CommentUpdate, state.clone(), update).await;
    register_store_handler(server, Method::CommentDelete, state.clone(), delete).await;
    register_store_handler(server, Method::CommentList, state, list).await;
}

fn create(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let comment = NewComment {
        post_id: PostId(id_param(req, "post_id")?),
        parent_id: optional_id_param(req, "parent_id")?.map(CommentId),
        content: str_param(req, "content")?.to_string(),
    };

    let comment = state
        .board
        .create_comment(actor, comment)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &comment)
}

fn update(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let comment_id = CommentId(id_param(req, "comment_id")?);
    let content = str_param(req, "content")?;

    let comment = state
        .board
        .update_comment(actor, comment_id, content)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &comment)
}

fn delete(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let comment_id = CommentId(id_param(req, "comment_id")?);

    let comment = state
        .board
        .delete_comment(actor, comment_id)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({
        "comment_id": comment.id,
        "post_id": comment.post_id,
        "deleted": true,
    }))
}

fn list(state: &AppState, _ctx: &SessionContext, req: &Request) -> HandlerResult {
    let post_id = PostId(id_param(req, "post_id")?);
    let comments = state
        .board
        .comments(post_id)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "comments": to_value(req, &comments)? }))
}
