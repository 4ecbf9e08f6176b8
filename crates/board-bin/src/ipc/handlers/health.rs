//! Health and shutdown handlers.

use board_ipc::{IpcServer, Method, Response};
use tracing::info;

use crate::app::AppState;

/// Register health and shutdown handlers.
pub async fn register(server: &IpcServer, state: AppState) {
    server
        .register_handler(Method::Health, move |_ctx, req| {
            let registry = state.registry.clone();
            async move {
                Response::success(
                    &req.id,
                    serde_json::json!({
                        "status": "ok",
                        "version": env!("CARGO_PKG_VERSION"),
                        "sessions": registry.session_count(),
                        "channels": registry.channel_count(),
                    }),
                )
            }
        })
        .await;

    let shutdown_tx = server.shutdown_sender();
    server
        .register_handler(Method::Shutdown, move |_ctx, req| {
            let tx = shutdown_tx.clone();
            async move {
                let _ = tx.send(());
                Response::success(&req.id, serde_json::json!({ "status": "shutting_down" }))
            }
        })
        .await;

    info!("Registered health handlers");
}
