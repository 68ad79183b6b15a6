//! Content-addressed stage caching with in-flight coalescing.
//!
//! Every pipeline stage transition goes through the same protocol: build the
//! `{stage}-{digest}-{fingerprint}` key, try the artifact store, and fall
//! back to a coalesced computation that persists its result before releasing
//! waiters. Changed content or configuration changes the key, so stale
//! entries are orphaned rather than invalidated in place.

mod flight;
mod keys;
mod stage;
mod store;

pub use flight::FlightMap;
pub use keys::{Stage, cache_key};
pub use stage::StageCache;
pub use store::{ArtifactStore, MemoryArtifactStore, StoreError};
