//! Application wiring and lifecycle management.

mod init;
mod lifecycle;
mod presence;
mod state;

pub use init::{build_server, run_server};
pub use lifecycle::{check_status, stop_server};
pub use presence::Presence;
pub use state::AppState;
