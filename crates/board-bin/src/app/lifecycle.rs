//! Server lifecycle management (stop, status).

use std::path::Path;
use std::time::Duration;

use board_config_and_utils::Paths;
use board_ipc::{IpcClient, Method};

/// Polls of the socket while waiting for a graceful exit.
const STOP_POLLS: u32 = 30;
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stop the server: ask over IPC, then SIGKILL the recorded PID if the
/// socket is still there once the grace period ends.
pub async fn stop_server(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Server is not running (socket not found)");
        remove_runtime_files(paths);
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());
    match client.call_method(Method::Shutdown).await {
        Ok(response) if response.is_success() => println!("Shutdown requested"),
        Ok(response) => println!("Server refused shutdown: {:?}", response.error),
        Err(e) => println!("Server unreachable: {}", e),
    }

    if socket_released(&socket_path).await {
        println!("Server stopped");
        return Ok(());
    }

    match read_pid(paths) {
        Some(pid) => {
            println!("Server still running, sending SIGKILL to PID {}", pid);
            // SAFETY: kill(2) has no memory-safety preconditions.
            unsafe {
                libc::kill(pid, libc::SIGKILL);
            }
        }
        None => println!("No PID recorded, removing stale socket"),
    }
    remove_runtime_files(paths);

    Ok(())
}

async fn socket_released(socket_path: &Path) -> bool {
    for _ in 0..STOP_POLLS {
        tokio::time::sleep(STOP_POLL_INTERVAL).await;
        if !socket_path.exists() {
            return true;
        }
    }
    false
}

fn remove_runtime_files(paths: &Paths) {
    for path in [paths.socket_file(), paths.pid_file()] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Check server status.
pub async fn check_status(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("Server is not running (socket not found)");
        return Ok(());
    }

    let client = IpcClient::new(&socket_path.to_string_lossy());

    match client.call_method(Method::Health).await {
        Ok(response) if response.is_success() => {
            let result = response.result.unwrap_or_default();
            let field = |name: &str| {
                result
                    .get(name)
                    .map(|v| v.to_string().trim_matches('"').to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            };

            println!("Server is running");
            println!("  Status:   {}", field("status"));
            println!("  Version:  {}", field("version"));
            println!("  Sessions: {}", field("sessions"));
            println!("  Channels: {}", field("channels"));
            if let Some(pid) = read_pid(paths) {
                println!("  PID:      {}", pid);
            }
            println!("  Socket:   {}", socket_path.display());
        }
        Ok(response) => {
            println!("Server returned error: {:?}", response.error);
        }
        Err(e) => {
            println!("Failed to connect to server: {}", e);
            println!("Server may not be running or socket may be stale");
        }
    }

    Ok(())
}

fn read_pid(paths: &Paths) -> Option<i32> {
    std::fs::read_to_string(paths.pid_file())
        .ok()
        .and_then(|pid| pid.trim().parse().ok())
}
