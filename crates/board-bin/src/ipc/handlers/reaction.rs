//! Like and bookmark handlers.

use board_ipc::{IpcServer, Method, Request, SessionContext};
use board_protocol_types::PostId;
use board_store::{BoardReader, BoardWriter};

use super::common::{id_param, identified, register_store_handler, store_error, to_value, HandlerResult};
use crate::app::AppState;

/// Register like and bookmark handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    register_store_handler(server, Method::LikeToggle, state.clone(), toggle_like).await;
    register_store_handler(server, Method::LikeGet, state.clone(), get_likes).await;
    register_store_handler(server, Method::BookmarkToggle, state.clone(), toggle_bookmark).await;
    register_store_handler(server, Method::BookmarkList, state, list_bookmarks).await;
}

fn toggle_like(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let post_id = PostId(id_param(req, "post_id")?);

    let toggle = state
        .board
        .toggle_like(actor, post_id)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({
        "post_id": post_id,
        "liked": toggle.liked,
        "likes": toggle.state.likes,
    }))
}

fn get_likes(state: &AppState, _ctx: &SessionContext, req: &Request) -> HandlerResult {
    let post_id = PostId(id_param(req, "post_id")?);
    let likes = state.board.likes(post_id).map_err(|e| store_error(req, e))?;
    to_value(req, &likes)
}

fn toggle_bookmark(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let actor = identified(ctx, req)?;
    let post_id = PostId(id_param(req, "post_id")?);

    let bookmark = state
        .board
        .toggle_bookmark(actor, post_id)
        .map_err(|e| store_error(req, e))?;
    to_value(req, &bookmark)
}

fn list_bookmarks(state: &AppState, ctx: &SessionContext, req: &Request) -> HandlerResult {
    let user = identified(ctx, req)?;
    let posts = state
        .board
        .bookmarked_posts(user)
        .map_err(|e| store_error(req, e))?;
    Ok(serde_json::json!({ "posts": to_value(req, &posts)? }))
}
