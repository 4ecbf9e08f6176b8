//! Core configuration, paths and utilities for the roomboard server.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level, CentralLogWriter};
pub use paths::Paths;
