//! Broadcast channel registry.
//!
//! Tracks which connected sessions are joined to which channels and fans
//! events out to them. Membership lives in memory only: a channel exists while
//! it has at least one member, and nothing is replayed to late joiners or
//! queued for disconnected sessions.
//!
//! The registry is an explicit service: create it, `init` it on server start,
//! clone it into whatever needs to publish, and `teardown` it on shutdown.

mod error;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{ChannelRegistry, SessionEvents};
