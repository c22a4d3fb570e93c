//! Gate handler implementing the pipeline stage contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::pipeline::{
    MetricsPayload, RequestContext, StageConfig, StageContract, StageError, StageResult,
    StageStatus,
};

use super::config::GateConfig;
use super::codec::AllowData;
use super::engine;
use super::options::{AllowValue, BlockedHandler, GateOptions, RawOptions};

/// Counters for the gate handler.
#[derive(Debug, Default)]
pub struct GateStats {
    /// Total requests checked.
    pub requests_checked: AtomicU64,
    /// Requests allowed through.
    pub requests_allowed: AtomicU64,
    /// Requests blocked.
    pub requests_blocked: AtomicU64,
    /// Failures resolving a dynamic allow source.
    pub resolve_failures: AtomicU64,
}

impl GateStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision.
    pub fn record_check(&self, allowed: bool) {
        self.requests_checked.fetch_add(1, Ordering::Relaxed);
        if allowed {
            self.requests_allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_blocked.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// The allow-list gate as a pipeline stage.
///
/// Built from [`RawOptions`] (and/or a declarative TOML fragment handed to
/// `init`), the handler packs its configuration once at init time and
/// decides per request in `call`. Allowed requests pass through untouched;
/// blocked requests go to the configured blocked handler, which by default
/// stages the configured response and halts the context.
#[derive(Debug)]
pub struct GateHandler {
    /// Options awaiting packing; consumed by `init`.
    raw: Option<RawOptions>,

    /// Packed options, present while running.
    options: Option<GateOptions>,

    /// Current status.
    status: StageStatus,

    /// Counters.
    stats: Arc<GateStats>,
}

impl GateHandler {
    /// Create a gate handler from raw options.
    #[must_use]
    pub fn new(raw: RawOptions) -> Self {
        Self {
            raw: Some(raw),
            options: None,
            status: StageStatus::Stopped,
            stats: Arc::new(GateStats::new()),
        }
    }

    /// Get the handler's counters.
    #[must_use]
    pub fn stats(&self) -> &GateStats {
        &self.stats
    }

    /// The packed options, if the handler is initialized.
    #[must_use]
    pub fn options(&self) -> Option<&GateOptions> {
        self.options.as_ref()
    }

    /// Overlay a declarative config fragment onto the raw options.
    ///
    /// A declared allow list replaces the builder-supplied one; the
    /// response fields are taken from the fragment wholesale, defaults
    /// included.
    fn apply_declared(mut raw: RawOptions, declared: GateConfig) -> RawOptions {
        if let Some(data) = declared.allow {
            raw.allow = Some(match data {
                AllowData::Entries(entries) => AllowValue::Entries(entries),
                AllowData::Delimited(text) => AllowValue::Delimited(text),
            });
        }
        raw.response_code_on_blocked = Some(declared.response_code_on_blocked);
        raw.response_body_on_blocked = Some(declared.response_body_on_blocked);
        raw
    }
}

impl StageContract for GateHandler {
    fn init(&mut self, config: StageConfig) -> StageResult<()> {
        if self.status != StageStatus::Stopped {
            return Err(StageError::InvalidState {
                current: self.status.to_string(),
                expected: "stopped".to_string(),
            });
        }

        debug!("initializing allow-list gate");

        let mut raw = self.raw.take().unwrap_or_default();

        if let Some(raw_toml) = config.raw_config() {
            let declared: GateConfig = toml::from_str(raw_toml)
                .map_err(|e| StageError::ConfigError(format!("failed to parse config: {e}")))?;
            declared.validate().map_err(StageError::ConfigError)?;
            raw = Self::apply_declared(raw, declared);
        }

        let options = GateOptions::pack(raw)
            .map_err(|e| StageError::ConfigError(e.to_string()))?
            .optimize();

        self.options = Some(options);
        self.status = StageStatus::Running;

        info!("allow-list gate initialized");
        Ok(())
    }

    fn call(&self, ctx: RequestContext) -> StageResult<RequestContext> {
        let Some(options) = self.options.as_ref() else {
            return Err(StageError::InvalidState {
                current: self.status.to_string(),
                expected: "running".to_string(),
            });
        };

        let resolved = match options.unpack() {
            Ok(resolved) => resolved,
            Err(e) => {
                self.stats.resolve_failures.fetch_add(1, Ordering::Relaxed);
                warn!("allow-list resolution failed: {e}");
                return Err(StageError::ResolveFailed(e.to_string()));
            },
        };

        let allowed = engine::decide_request(&ctx, &resolved);
        self.stats.record_check(allowed);

        if allowed {
            return Ok(ctx);
        }

        debug!("peer {:?} blocked", ctx.peer);

        match &resolved.on_blocked {
            BlockedHandler::Default => Ok(ctx
                .respond(
                    resolved.response_code_on_blocked,
                    resolved.response_body_on_blocked,
                )
                .halt()),
            BlockedHandler::Callable(handler) | BlockedHandler::Bound(handler) => {
                Ok(handler.as_ref()(ctx, options))
            },
            BlockedHandler::Adapter(stage) => stage.call(ctx),
        }
    }

    fn stop(&mut self) -> StageResult<()> {
        debug!("stopping allow-list gate");

        self.options = None;
        self.status = StageStatus::Stopped;

        info!("allow-list gate stopped");
        Ok(())
    }

    fn status(&self) -> StageStatus {
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let mut metrics = MetricsPayload::new();

        metrics.counter(
            "requests_checked",
            self.stats.requests_checked.load(Ordering::Relaxed),
        );
        metrics.counter(
            "requests_allowed",
            self.stats.requests_allowed.load(Ordering::Relaxed),
        );
        metrics.counter(
            "requests_blocked",
            self.stats.requests_blocked.load(Ordering::Relaxed),
        );
        metrics.counter(
            "resolve_failures",
            self.stats.resolve_failures.load(Ordering::Relaxed),
        );

        metrics
    }
}
