//! The stage cache protocol.
//!
//! One generic wrapper serves every pipeline stage: check the artifact
//! store, then hand a named compute function to the flight map. The
//! coalesced computation persists its result before the ticket is released,
//! so a fresh caller arriving after completion hits the cache instead of
//! racing an unflushed write.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cache::flight::FlightMap;
use crate::cache::keys::{Stage, cache_key};
use crate::cache::store::ArtifactStore;
use crate::domain::document::SourceDocument;
use crate::error::PipelineError;
use crate::telemetry::{
    METRIC_STAGE_CACHE_HIT_TOTAL, METRIC_STAGE_CACHE_MISS_TOTAL, METRIC_STAGE_COMPUTE_MS,
};

/// Cache front for every stage of one pipeline.
pub struct StageCache {
    store: Arc<dyn ArtifactStore>,
    flights: FlightMap,
}

impl StageCache {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            flights: FlightMap::new(),
        }
    }

    /// Return the cached artifact for `(stage, document, fingerprint)` or
    /// run `compute` exactly once under concurrent demand.
    ///
    /// A store read failure or an undecodable cached value is logged and
    /// treated as a miss. A store write failure is logged and the computed
    /// artifact still returned; only its persistence is lost. A failing
    /// `compute` propagates to every waiter and caches nothing.
    pub async fn fetch_or_compute<T, F, Fut>(
        &self,
        stage: Stage,
        document: &SourceDocument,
        fingerprint: &str,
        compute: F,
    ) -> Result<T, PipelineError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, PipelineError>> + Send + 'static,
    {
        let key = cache_key(stage, document.digest(), fingerprint);
        let stage_name = stage.as_str();

        match self.store.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(artifact) => {
                    counter!(METRIC_STAGE_CACHE_HIT_TOTAL, "stage" => stage_name).increment(1);
                    return Ok(artifact);
                }
                Err(err) => warn!(
                    target = "cache::stage",
                    key = %key,
                    error = %err,
                    "Cached artifact failed to decode; recomputing"
                ),
            },
            Ok(None) => {}
            Err(err) => warn!(
                target = "cache::stage",
                key = %key,
                error = %err,
                "Artifact store read failed; treating as cache miss"
            ),
        }
        counter!(METRIC_STAGE_CACHE_MISS_TOTAL, "stage" => stage_name).increment(1);

        let store = Arc::clone(&self.store);
        let write_key = key.clone();
        let value = self
            .flights
            .run(&key, move || {
                let fut = compute();
                async move {
                    let started = Instant::now();
                    let artifact = fut.await?;
                    let value =
                        serde_json::to_value(&artifact).map_err(|err| PipelineError::Encode {
                            stage: stage_name,
                            message: err.to_string(),
                        })?;
                    if let Err(err) = store.set(&write_key, value.clone()).await {
                        warn!(
                            target = "cache::stage",
                            key = %write_key,
                            error = %err,
                            "Artifact store write failed; next caller will recompute"
                        );
                    }
                    histogram!(METRIC_STAGE_COMPUTE_MS, "stage" => stage_name)
                        .record(started.elapsed().as_secs_f64() * 1000.0);
                    Ok(value)
                }
            })
            .await?;

        serde_json::from_value(value).map_err(|err| PipelineError::Decode {
            stage: stage_name,
            message: err.to_string(),
        })
    }

    /// Number of computations currently in flight, across all stages.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::cache::store::{MemoryArtifactStore, StoreError};

    fn document() -> SourceDocument {
        SourceDocument::new("post-1", "post-1", "# Title")
    }

    #[tokio::test]
    async fn second_fetch_hits_cache_without_recomputing() {
        let store = Arc::new(MemoryArtifactStore::new());
        let cache = StageCache::new(store.clone());
        let runs = Arc::new(AtomicUsize::new(0));
        let document = document();

        for _ in 0..2 {
            let runs = Arc::clone(&runs);
            let value: String = cache
                .fetch_or_compute(Stage::Ast, &document, "fp", move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok("artifact".to_string())
                })
                .await
                .expect("fetch");
            assert_eq!(value, "artifact");
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_compute_persists_nothing_and_is_retried() {
        let store = Arc::new(MemoryArtifactStore::new());
        let cache = StageCache::new(store.clone());
        let document = document();

        let failed: Result<String, _> = cache
            .fetch_or_compute(Stage::Ast, &document, "fp", || async {
                Err(PipelineError::Encode {
                    stage: "ast",
                    message: "boom".to_string(),
                })
            })
            .await;
        assert!(failed.is_err());
        assert!(store.is_empty());
        assert_eq!(cache.in_flight(), 0);

        let recovered: String = cache
            .fetch_or_compute(Stage::Ast, &document, "fp", || async {
                Ok("second try".to_string())
            })
            .await
            .expect("retry");
        assert_eq!(recovered, "second try");
        assert_eq!(store.len(), 1);
    }

    struct WriteFailingStore;

    #[async_trait]
    impl ArtifactStore for WriteFailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::write("disk full"))
        }
    }

    #[tokio::test]
    async fn write_failure_still_returns_the_computed_value() {
        let cache = StageCache::new(Arc::new(WriteFailingStore));
        let document = document();
        let runs = Arc::new(AtomicUsize::new(0));

        for expected_runs in 1..=2 {
            let probe = Arc::clone(&runs);
            let value: String = cache
                .fetch_or_compute(Stage::Html, &document, "fp", move || async move {
                    probe.fetch_add(1, Ordering::SeqCst);
                    Ok("compiled".to_string())
                })
                .await
                .expect("fetch");
            assert_eq!(value, "compiled");
            // Nothing persisted, so every call recomputes.
            assert_eq!(runs.load(Ordering::SeqCst), expected_runs);
        }
    }

    struct ReadFailingStore {
        inner: MemoryArtifactStore,
    }

    #[async_trait]
    impl ArtifactStore for ReadFailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::read("connection reset"))
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn read_failure_degrades_to_miss() {
        let cache = StageCache::new(Arc::new(ReadFailingStore {
            inner: MemoryArtifactStore::new(),
        }));
        let document = document();

        let value: String = cache
            .fetch_or_compute(Stage::Toc, &document, "fp", || async {
                Ok("<ul></ul>".to_string())
            })
            .await
            .expect("fetch");
        assert_eq!(value, "<ul></ul>");
    }
}
