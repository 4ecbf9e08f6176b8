//! Roomboard server: real-time fan-out for the rooms/jobs board.

mod app;
mod fanout_adapter;
mod ipc;

use std::path::PathBuf;

use board_config_and_utils::{init_logging, Config, Paths};
use clap::{Parser, Subcommand};

/// Roomboard command-line interface.
#[derive(Parser)]
#[command(name = "roomboard")]
#[command(about = "Roomboard server: listings, comments, chats and live updates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (socket, logs, config). Defaults to ~/.roomboard
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server in the foreground
    Start,
    /// Stop the server
    Stop,
    /// Check server status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    match cli.command {
        Some(Commands::Start) | None => {
            paths.ensure_dirs()?;
            init_logging(&config.log_level, &paths.log_file(), config.log_to_stderr);
            app::run_server(config, paths).await?;
        }
        Some(Commands::Stop) => {
            app::stop_server(&paths).await?;
        }
        Some(Commands::Status) => {
            app::check_status(&paths).await?;
        }
    }

    Ok(())
}
