//! Metric names and registration.
//!
//! The library records against whatever recorder the host installs; nothing
//! here installs a subscriber or exporter.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};

pub const METRIC_STAGE_CACHE_HIT_TOTAL: &str = "foglio_stage_cache_hit_total";
pub const METRIC_STAGE_CACHE_MISS_TOTAL: &str = "foglio_stage_cache_miss_total";
pub const METRIC_STAGE_CACHE_JOIN_TOTAL: &str = "foglio_stage_cache_join_total";
pub const METRIC_STAGE_COMPUTE_MS: &str = "foglio_stage_compute_ms";

static DESCRIPTIONS: Once = Once::new();

/// Register metric descriptions with the installed recorder. Called once per
/// process, from pipeline construction.
pub fn describe_metrics() {
    DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_STAGE_CACHE_HIT_TOTAL,
            Unit::Count,
            "Total number of stage cache hits."
        );
        describe_counter!(
            METRIC_STAGE_CACHE_MISS_TOTAL,
            Unit::Count,
            "Total number of stage cache misses."
        );
        describe_counter!(
            METRIC_STAGE_CACHE_JOIN_TOTAL,
            Unit::Count,
            "Total number of callers that joined an in-flight computation."
        );
        describe_histogram!(
            METRIC_STAGE_COMPUTE_MS,
            Unit::Milliseconds,
            "Wall-clock duration of stage computations, including persistence."
        );
    });
}
