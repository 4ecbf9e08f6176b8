//! Helpers shared by the handler modules.

use board_ipc::{error_codes, IpcServer, Method, Request, Response, SessionContext};
use board_protocol_types::UserId;
use board_store::StoreError;
use serde::Serialize;
use tracing::{debug, error};

use crate::app::AppState;

/// Result body of a handler, or the error response to send instead.
pub(crate) type HandlerResult = Result<serde_json::Value, Response>;

/// Register a handler that answers synchronously from the board store.
pub(crate) async fn register_store_handler<F>(
    server: &IpcServer,
    method: Method,
    state: AppState,
    handler: F,
) where
    F: Fn(&AppState, &SessionContext, &Request) -> HandlerResult + Send + Sync + 'static,
{
    server
        .register_handler(method, move |ctx, req| {
            let response = reply(&req, handler(&state, &ctx, &req));
            std::future::ready(response)
        })
        .await;
}

fn reply(req: &Request, result: HandlerResult) -> Response {
    match result {
        Ok(value) => Response::success(&req.id, value),
        Err(response) => response,
    }
}

/// Map a store failure onto a JSON-RPC error.
pub(crate) fn store_error(req: &Request, err: StoreError) -> Response {
    let code = match &err {
        StoreError::Validation(_) => error_codes::INVALID_PARAMS,
        StoreError::NotFound(_) => error_codes::NOT_FOUND,
        StoreError::Forbidden(_) => error_codes::FORBIDDEN,
        StoreError::Conflict(_) => error_codes::CONFLICT,
        StoreError::Sqlite(_) => {
            error!(method = ?req.method, error = %err, "Store failure");
            error_codes::INTERNAL_ERROR
        }
    };
    debug!(method = ?req.method, code, error = %err, "Request rejected");
    Response::error(&req.id, code, &err.to_string())
}

/// The user the session identified as.
pub(crate) fn identified(ctx: &SessionContext, req: &Request) -> Result<UserId, Response> {
    ctx.user().ok_or_else(|| {
        Response::error(
            &req.id,
            error_codes::NOT_AUTHENTICATED,
            "session.identify is required first",
        )
    })
}

pub(crate) fn invalid_params(req: &Request, message: &str) -> Response {
    Response::error(&req.id, error_codes::INVALID_PARAMS, message)
}

/// A required integer parameter.
pub(crate) fn id_param(req: &Request, name: &str) -> Result<i64, Response> {
    req.i64_param(name)
        .ok_or_else(|| invalid_params(req, &format!("{} is required", name)))
}

/// An optional integer parameter. Present but not an integer is an error.
pub(crate) fn optional_id_param(req: &Request, name: &str) -> Result<Option<i64>, Response> {
    match req.param(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(_) => id_param(req, name).map(Some),
    }
}

/// A required string parameter.
pub(crate) fn str_param<'a>(req: &'a Request, name: &str) -> Result<&'a str, Response> {
    req.str_param(name)
        .ok_or_else(|| invalid_params(req, &format!("{} is required", name)))
}

pub(crate) fn to_value<T: Serialize>(req: &Request, value: &T) -> HandlerResult {
    serde_json::to_value(value).map_err(|e| {
        Response::error(
            &req.id,
            error_codes::INTERNAL_ERROR,
            &format!("Failed to encode result: {}", e),
        )
    })
}
