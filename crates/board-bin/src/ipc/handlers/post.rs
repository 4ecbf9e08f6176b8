//! Post handlers.

use board_ipc::{IpcServer, Method, Request, Response, SessionContext};
use board_protocol_types::{PostId, PostKind};
use board_store::{BoardReader, BoardWriter, NewPost, PostUpdate};

use super::common::{
    id_param, identified, invalid_params, register_store_handler, store_error, str_param,
    to_value, HandlerResult,
};
use crate::app::AppState;

/// Register post handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::PostCreate, state.clone(), create).await;
    register_store_handler(server, Method::PostUpdate, state.clone(), update).await;
    register_store_handler(server, Method::PostDelete, state.clone(), delete).await;
    register_store_handler(server, Method::PostGet, state.clone(), get).await;
    register_store_handler(server, Method::PostList, state, list).await;
}

fn kind_param(req: &Request, value: &str) -> Result<PostKind, Response> {
    PostKind::parse(value).ok_or_else(|| invalid_params(req, "kind must be room or job"))
}

fn optional_string(req: &Request, name: &str) -> Option<String> {
    req.str_param(name).map(String::from)
}

fn create(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let post = NewPost {
        kind: kind_param(req, str_param(req, "kind")?)?,
        title: str_param(req, "title")?.to_string(),
        content: str_param(req, "content")?.to_string(),
        location: optional_string(req, "location"),
    };

    let post = state
        .board
        .create_post(actor, post)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &post)
}

fn update(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let post_id = PostId(id_param(req, "post_id")?);
    let update = PostUpdate {
        title: optional_string(req, "title"),
        content: optional_string(req, "content"),
        location: optional_string(req, "location"),
    };

    let post = state
        .board
        .update_post(actor, post_id, update)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &post)
}

fn delete(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let post_id = PostId(id_param(req, "post_id")?);

    state
        .board
        .delete_post(actor, post_id)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "post_id": post_id, "deleted": true }))
}

fn get(state: &AppState, _ctx: &SessionContext, req: &Request) -> HandlerResult {
    let post_id = PostId(id_param(req, "post_id")?);
    let post = state.board.post(post_id).map_err(|e| store_error(req, e))?;
    to_value(req, &post)
}

fn list(state: &AppState, _ctx: &SessionContext, req: &Request) -> HandlerResult {
    let kind = match req.str_param("kind") {
        Some(kind) => Some(kind_param(req, kind)?),
        None => None,
    };
    let posts = state.board.posts(kind).map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "posts": to_value(req, &posts)? }))
}
