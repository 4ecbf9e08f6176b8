//! Client cache reconciler.
//!
//! A session keeps the query results it has loaded in a [`ClientCache`] and
//! merges every broadcast [`Event`](board_protocol_types::Event) into it:
//!
//! - create events append unless the primary key is already present
//! - update events replace a present entry and are dropped otherwise
//! - delete events remove a present entry and are no-ops otherwise
//! - status events overwrite a value slot
//!
//! Every rule is idempotent, so a mutation's direct response and its
//! broadcast may arrive in either order, or both, and the cache converges.
//!
//! - [`collection`] - Ordered, key-unique cached collections
//! - [`query_key`] - Addresses of cached query results
//! - [`cache`] - The cache and its merge rules
//! - [`speculation`] - Optimistic slot updates with explicit rollback

pub mod cache;
pub mod collection;
pub mod query_key;
pub mod speculation;

pub use cache::{ClientCache, MergeOutcome};
pub use collection::{CachedCollection, Record};
pub use query_key::QueryKey;
pub use speculation::Speculation;
