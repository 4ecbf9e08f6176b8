//! Server initialization.

use std::path::Path;

use board_config_and_utils::{Config, Paths};
use board_ipc::{IpcClient, IpcServer, Method};
use board_store::{Board, StoreResult};
use channel_registry::ChannelRegistry;
use tracing::{info, warn};

use crate::app::AppState;
use crate::fanout_adapter::FanOutSink;
use crate::ipc::register_handlers;

/// Open the store and wire it to a fresh registry and IPC server.
///
/// The registry is returned closed; call `init` on it before serving.
pub async fn build_server(
    socket_path: &Path,
    database_path: &Path,
) -> StoreResult<(IpcServer, AppState)> {
    let registry = ChannelRegistry::new();
    let board = Board::open(database_path, FanOutSink::new(registry.clone()))?;
    info!(path = %database_path.display(), "Board store opened");

    let state = AppState::new(board, registry.clone());
    let server = IpcServer::new(&socket_path.to_string_lossy(), registry);
    register_handlers(&server, state.clone()).await;

    Ok((server, state))
}

/// Run the server until a shutdown request or Ctrl-C.
pub async fn run_server(config: Config, paths: Paths) -> Result<(), Box<dyn std::error::Error>> {
    // Singleton enforcement: check if a server is already running
    let socket_path = paths.socket_file();
    if socket_path.exists() {
        let client = IpcClient::new(&socket_path.to_string_lossy());
        if client.call_method(Method::Health).await.is_ok() {
            eprintln!("Error: Server is already running. Use 'roomboard stop' to stop it first.");
            std::process::exit(1);
        }
        warn!("Removing stale socket file");
        let _ = std::fs::remove_file(&socket_path);
    }

    let pid_file = paths.pid_file();
    if pid_file.exists() {
        let _ = std::fs::remove_file(&pid_file);
    }

    info!(log_level = %config.log_level, "Starting roomboard server");

    paths.ensure_dirs()?;

    let pid = std::process::id();
    std::fs::write(&pid_file, pid.to_string())?;
    info!(pid = pid, "Server started");

    let (server, state) = build_server(&socket_path, &paths.database_file())
        .await
        .map_err(|e| format!("Failed to open board store: {}", e))?;
    state.registry.init();

    // Ctrl-C triggers the same shutdown path as the shutdown request
    let shutdown_tx = server.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            let _ = shutdown_tx.send(());
        }
    });

    let result = server.run().await;

    state.registry.teardown();
    let _ = std::fs::remove_file(&pid_file);
    info!("Server stopped");

    result?;
    Ok(())
}
