//! In-flight coalescing of stage computations.
//!
//! Concurrent demand for a not-yet-cached key must trigger exactly one
//! computation, with every caller observing its result. The DashMap entry
//! API makes check-for-existing and register-new one atomic step, and a drop
//! guard removes the ticket before any waiter sees the outcome, so a failed
//! computation leaves the key eligible for retry.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use serde_json::Value;

use crate::error::PipelineError;
use crate::telemetry::METRIC_STAGE_CACHE_JOIN_TOTAL;

type SharedComputation = Shared<BoxFuture<'static, Result<Value, PipelineError>>>;

/// Coordinator mapping cache keys to pending computations.
///
/// Instance-scoped: owned by the stage cache of one pipeline, never shared
/// process-wide, so tests and tenants cannot leak flights into each other.
#[derive(Default)]
pub struct FlightMap {
    pending: Arc<DashMap<String, SharedComputation>>,
}

impl FlightMap {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Number of computations currently in flight.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run `compute` for `key`, joining an already-pending computation when
    /// one exists. `compute` is invoked only by the caller that registers
    /// the ticket; everyone else awaits the shared handle.
    pub async fn run<F, Fut>(&self, key: &str, compute: F) -> Result<Value, PipelineError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Value, PipelineError>> + Send + 'static,
    {
        use dashmap::mapref::entry::Entry;

        let shared = match self.pending.entry(key.to_owned()) {
            Entry::Occupied(occupied) => {
                counter!(METRIC_STAGE_CACHE_JOIN_TOTAL).increment(1);
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                let ticket = Ticket {
                    key: key.to_owned(),
                    pending: Arc::clone(&self.pending),
                };
                let fut = compute();
                let computation = async move {
                    let result = fut.await;
                    // Release the ticket before resolving so no waiter can
                    // join a finished flight.
                    drop(ticket);
                    result
                }
                .boxed()
                .shared();
                vacant.insert(computation.clone());
                computation
            }
        };

        shared.await
    }
}

/// Removes its key from the pending table when dropped, which also covers a
/// computation that panics or is dropped before completion.
struct Ticket {
    key: String,
    pending: Arc<DashMap<String, SharedComputation>>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}
