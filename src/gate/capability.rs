//! Capability resolution for caller modules.
//!
//! A caller may hand the gate a module object instead of (or alongside)
//! explicit options. The module declares which of the gate's extension
//! points it provides by implementing [`GateCapabilities`]; each capability
//! is optionally present and defaults to absent.

use crate::pipeline::StageContract;

use super::options::{AllowProvider, AllowValue, BlockedHandlerFn, BlockedValue, RawOptions};

/// Capabilities a configuration module may expose to the gate.
///
/// Implement only the methods for the capabilities the module actually
/// provides; the defaults declare everything absent.
pub trait GateCapabilities: Send + Sync {
    /// An allow-list provider: a zero-argument function invoked per
    /// decision.
    fn allow_list(&self) -> Option<AllowProvider> {
        None
    }

    /// A preferred blocked handler: a two-argument function receiving the
    /// request context and the packed options.
    fn blocked_handler(&self) -> Option<BlockedHandlerFn> {
        None
    }

    /// A generic pipeline stage (init + call) to delegate blocked requests
    /// to when no preferred handler is provided.
    fn blocked_stage(&self) -> Option<Box<dyn StageContract>> {
        None
    }
}

/// Fold a configured module's capabilities into the raw options.
///
/// Module-derived configuration is authoritative: a module-provided allow
/// list replaces any explicit `allow` value, and a module-provided blocked
/// handler replaces any explicit `on_blocked` value. A preferred handler
/// wins over a generic stage capability. A module providing neither leaves
/// the explicit values untouched.
///
/// Never fails; a configuration with no usable allow source is rejected
/// later, by packing.
#[must_use]
pub fn resolve(mut raw: RawOptions) -> RawOptions {
    let Some(module) = raw.module.take() else {
        return raw;
    };

    if let Some(provider) = module.allow_list() {
        raw.allow = Some(AllowValue::Bound(provider));
    }

    if let Some(handler) = module.blocked_handler() {
        raw.on_blocked = Some(BlockedValue::Bound(handler));
    } else if let Some(stage) = module.blocked_stage() {
        raw.on_blocked = Some(BlockedValue::Stage(stage));
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::codec::AllowData;
    use crate::pipeline::{RequestContext, StageConfig, StageResult, StageStatus};
    use std::sync::Arc;

    struct AllowOnlyModule;

    impl GateCapabilities for AllowOnlyModule {
        fn allow_list(&self) -> Option<AllowProvider> {
            Some(Arc::new(|| AllowData::Delimited("10.0.0.0/8".to_string())))
        }
    }

    struct HandlerModule;

    impl GateCapabilities for HandlerModule {
        fn blocked_handler(&self) -> Option<BlockedHandlerFn> {
            Some(Arc::new(|ctx, _options| ctx.respond(403, "Forbidden").halt()))
        }

        fn blocked_stage(&self) -> Option<Box<dyn StageContract>> {
            Some(Box::new(RejectStage))
        }
    }

    struct StageOnlyModule;

    impl GateCapabilities for StageOnlyModule {
        fn blocked_stage(&self) -> Option<Box<dyn StageContract>> {
            Some(Box::new(RejectStage))
        }
    }

    struct EmptyModule;

    impl GateCapabilities for EmptyModule {}

    struct RejectStage;

    impl StageContract for RejectStage {
        fn init(&mut self, _config: StageConfig) -> StageResult<()> {
            Ok(())
        }

        fn call(&self, ctx: RequestContext) -> StageResult<RequestContext> {
            Ok(ctx.halt())
        }

        fn stop(&mut self) -> StageResult<()> {
            Ok(())
        }

        fn status(&self) -> StageStatus {
            StageStatus::Running
        }
    }

    #[test]
    fn test_no_module_passes_through() {
        let raw = resolve(RawOptions::new().with_allow_text("1.2.3.4"));
        assert!(matches!(raw.allow, Some(AllowValue::Delimited(_))));
        assert!(raw.on_blocked.is_none());
    }

    #[test]
    fn test_module_allow_overrides_explicit_allow() {
        let raw = resolve(
            RawOptions::new()
                .with_allow_text("1.2.3.4")
                .with_module(Arc::new(AllowOnlyModule)),
        );
        assert!(matches!(raw.allow, Some(AllowValue::Bound(_))));
    }

    #[test]
    fn test_module_handler_overrides_explicit_handler() {
        let raw = resolve(
            RawOptions::new()
                .with_on_blocked(|ctx, _options| ctx)
                .with_module(Arc::new(HandlerModule)),
        );
        // The preferred handler wins over both the explicit value and the
        // module's own stage capability.
        assert!(matches!(raw.on_blocked, Some(BlockedValue::Bound(_))));
    }

    #[test]
    fn test_stage_capability_used_without_preferred_handler() {
        let raw = resolve(RawOptions::new().with_module(Arc::new(StageOnlyModule)));
        assert!(matches!(raw.on_blocked, Some(BlockedValue::Stage(_))));
    }

    #[test]
    fn test_empty_module_leaves_options_untouched() {
        let raw = resolve(
            RawOptions::new()
                .with_allow_text("1.2.3.4")
                .with_module(Arc::new(EmptyModule)),
        );
        assert!(matches!(raw.allow, Some(AllowValue::Delimited(_))));
        assert!(raw.on_blocked.is_none());
    }

    #[test]
    fn test_module_not_retained_after_resolve() {
        let raw = resolve(RawOptions::new().with_module(Arc::new(AllowOnlyModule)));
        assert!(raw.module.is_none());
    }
}
