//! Artifact store capability.
//!
//! Persistence is injected by the host; the pipeline only fixes the key
//! format and the degradation rules (read failure ⇒ miss, write failure ⇒
//! lost persistence). Values are opaque JSON so the store never needs to
//! know artifact types.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

/// Store access failures. The stage cache downgrades both variants; they
/// never propagate into query results.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact store read failed: {message}")]
    Read { message: String },
    #[error("artifact store write failed: {message}")]
    Write { message: String },
}

impl StoreError {
    pub fn read(message: impl Into<String>) -> Self {
        StoreError::Read {
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        StoreError::Write {
            message: message.into(),
        }
    }
}

/// Capability-scoped key/value cache for stage artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Writes must be durable before `get` for the same key is relied upon;
    /// the stage cache persists before releasing coalesced waiters under
    /// that assumption.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory artifact store.
///
/// The default capability for hosts without external persistence, and the
/// backing store for tests. Unbounded: entries are orphaned by key rotation,
/// never evicted.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    entries: DashMap<String, Value>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryArtifactStore::new();
        assert!(store.get("ast-d-f").await.expect("get").is_none());

        store
            .set("ast-d-f", json!({"children": []}))
            .await
            .expect("set");

        let cached = store.get("ast-d-f").await.expect("get").expect("cached");
        assert_eq!(cached, json!({"children": []}));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn memory_store_overwrites_in_place() {
        let store = MemoryArtifactStore::new();
        store.set("k", json!(1)).await.expect("set");
        store.set("k", json!(2)).await.expect("set");

        assert_eq!(store.get("k").await.expect("get"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }
}
