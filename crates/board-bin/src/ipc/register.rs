//! Handler registration for the IPC server.

use board_ipc::IpcServer;
use tracing::info;

use crate::app::AppState;
use crate::ipc::handlers;

/// Register all IPC handlers.
pub async fn register_handlers(server: &IpcServer, state: AppState) {
    handlers::health::register(server, state.clone()).await;
    handlers::user::register(server, state.clone()).await;
    handlers::channel::register(server, state.clone()).await;
    handlers::post::register(server, state.clone()).await;
    handlers::comment::register(server, state.clone()).await;
    handlers::reaction::register(server, state.clone()).await;
    handlers::chat::register(server, state.clone()).await;

    register_disconnect_handler(server, state).await;

    info!("All IPC handlers registered");
}

/// A closed session no longer counts towards its user's presence.
async fn register_disconnect_handler(server: &IpcServer, state: AppState) {
    server
        .register_disconnect_handler(move |ctx| {
            if let Some(user) = ctx.user() {
                handlers::user::release(&state, user);
            }
            std::future::ready(())
        })
        .await;
}
