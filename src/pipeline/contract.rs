//! The pipeline stage contract trait.
//!
//! All stages managed by a host pipeline implement this trait for uniform
//! lifecycle management.

use super::{RequestContext, StageConfig, StageResult, StageStatus};
use std::collections::HashMap;

/// Metrics payload containing stage-specific metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsPayload {
    /// Counter metrics (monotonically increasing).
    pub counters: HashMap<String, u64>,

    /// Gauge metrics (can go up and down).
    pub gauges: HashMap<String, f64>,
}

impl MetricsPayload {
    /// Creates a new empty metrics payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a counter metric.
    pub fn counter(&mut self, name: impl Into<String>, value: u64) {
        self.counters.insert(name.into(), value);
    }

    /// Adds a gauge metric.
    pub fn gauge(&mut self, name: impl Into<String>, value: f64) {
        self.gauges.insert(name.into(), value);
    }

    /// Formats metrics in Prometheus text format.
    #[must_use]
    pub fn to_prometheus(&self, prefix: &str) -> String {
        let mut output = String::new();

        for (name, value) in &self.counters {
            output.push_str(&format!("{prefix}_{name} {value}\n"));
        }

        for (name, value) in &self.gauges {
            output.push_str(&format!("{prefix}_{name} {value}\n"));
        }

        output
    }
}

/// The contract a host pipeline uses to manage a stage.
///
/// # Lifecycle
///
/// 1. `init()` - One-time setup: normalize and validate configuration.
///    Expensive static work happens here, once, regardless of request volume.
/// 2. `call()` - Per-request processing.
/// 3. `status()` / `metrics()` - Ongoing monitoring.
/// 4. `stop()` - Graceful shutdown.
///
/// `call` takes `&self`: an initialized stage must be usable from concurrent
/// requests without synchronization.
pub trait StageContract: Send + Sync {
    /// Initializes the stage with the provided configuration.
    ///
    /// Called once before any request is processed. Configuration problems
    /// are structural: the stage must reject them here rather than limp
    /// along with a partial setup.
    ///
    /// # Errors
    ///
    /// Returns [`super::StageError::ConfigError`] if the configuration is
    /// invalid, or [`super::StageError::InvalidState`] if the stage is
    /// already initialized.
    fn init(&mut self, config: StageConfig) -> StageResult<()>;

    /// Processes one request context.
    ///
    /// The returned context may be passed through untouched, or carry a
    /// staged response with the halted flag set. What to do with a halted
    /// context (or an error) is the host's decision.
    ///
    /// # Errors
    ///
    /// Returns [`super::StageError::InvalidState`] if the stage is not
    /// running, or a stage-specific error when per-request resolution fails.
    fn call(&self, ctx: RequestContext) -> StageResult<RequestContext>;

    /// Stops the stage and releases its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if graceful shutdown fails.
    fn stop(&mut self) -> StageResult<()>;

    /// Returns the current status of the stage.
    fn status(&self) -> StageStatus;

    /// Returns the current metrics from the stage.
    ///
    /// The default implementation returns an empty payload.
    fn metrics(&self) -> MetricsPayload {
        MetricsPayload::new()
    }

    /// Called periodically for liveness checks.
    ///
    /// The default implementation returns `true` while the stage is running.
    fn heartbeat(&self) -> bool {
        self.status().is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_payload() {
        let mut metrics = MetricsPayload::new();
        metrics.counter("requests", 42);
        metrics.gauge("load", 0.5);

        assert_eq!(metrics.counters.get("requests"), Some(&42));
        assert_eq!(metrics.gauges.get("load"), Some(&0.5));
    }

    #[test]
    fn test_to_prometheus() {
        let mut metrics = MetricsPayload::new();
        metrics.counter("requests", 7);

        let text = metrics.to_prometheus("gate");
        assert!(text.contains("gate_requests 7"));
    }
}
