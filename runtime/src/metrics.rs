//! Metrics for observability and monitoring.
//!
//! The store records through the [`metrics`] facade; nothing is exported
//! unless the embedding application installs a recorder.
//!
//! - Dispatched actions, by type tag
//! - Reducer execution time
//! - Effects executed, by kind
//! - Pending effects

use metrics::{describe_counter, describe_gauge, describe_histogram};
use std::time::Duration;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Counter of dispatched actions, labelled by `type`
pub const ACTIONS_DISPATCHED: &str = "store_actions_dispatched_total";

/// Histogram of reducer execution time
pub const REDUCER_DURATION: &str = "store_reducer_duration_seconds";

/// Counter of effects executed, labelled by `kind`
pub const EFFECTS_EXECUTED: &str = "store_effects_executed_total";

/// Gauge of effects still running
pub const EFFECTS_PENDING: &str = "store_effects_pending";

/// Register all metric descriptions.
///
/// Call once after installing a recorder so exporters can show help text.
pub fn register_metrics() {
    describe_counter!(
        ACTIONS_DISPATCHED,
        "Total number of actions dispatched to stores"
    );
    describe_histogram!(
        REDUCER_DURATION,
        "Time taken to run the reducer for one action"
    );
    describe_counter!(EFFECTS_EXECUTED, "Total number of effects executed");
    describe_gauge!(EFFECTS_PENDING, "Number of effects still running");
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record one dispatched action and how long its reducer took.
    pub fn record_dispatch(action_type: &'static str, duration: Duration) {
        counter!(ACTIONS_DISPATCHED, "type" => action_type).increment(1);
        histogram!(REDUCER_DURATION).record(duration.as_secs_f64());
    }

    /// Record an effect of the given kind being executed.
    pub fn record_effect(kind: &'static str) {
        counter!(EFFECTS_EXECUTED, "kind" => kind).increment(1);
    }

    /// Record the number of effects still running.
    pub fn record_pending(pending: usize) {
        // Note: Precision loss acceptable for metrics (effect counts < 2^52)
        #[allow(clippy::cast_precision_loss)]
        gauge!(EFFECTS_PENDING).set(pending as f64);
    }
}
