//! Integration tests driving the allow-list gate through the stage contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use addrgate::gate::{
    AllowData, AllowProvider, BlockedHandlerFn, GateCapabilities, GateHandler, RawOptions,
};
use addrgate::pipeline::{
    RequestContext, StageConfig, StageContract, StageResult, StageStatus,
};

/// Run one request through a stage and return the resulting context.
fn check(stage: &dyn StageContract, peer: &str) -> RequestContext {
    stage
        .call(RequestContext::new().with_peer(peer))
        .expect("call should succeed")
}

#[test]
fn test_subnet_scenario() {
    let mut gate = GateHandler::new(RawOptions::new().with_allow_list(["10.0.0.0/24"]));
    gate.init(StageConfig::new()).unwrap();

    for peer in ["10.0.0.0", "10.0.0.127", "10.0.0.255"] {
        let ctx = check(&gate, peer);
        assert!(!ctx.is_halted(), "{peer} should be allowed");
    }

    let ctx = check(&gate, "10.0.1.0");
    assert!(ctx.is_halted());
    assert_eq!(ctx.response_code, Some(401));
    assert_eq!(ctx.response_body, Some("Not Authenticated".to_string()));
}

#[test]
fn test_mixed_family_scenario() {
    let mut gate = GateHandler::new(RawOptions::new().with_allow_list(["1.2.3.4", "1:2:3::4"]));
    gate.init(StageConfig::new()).unwrap();

    assert!(!check(&gate, "1.2.3.4").is_halted());
    assert!(check(&gate, "1.2.3.5").is_halted());
    assert!(!check(&gate, "1:2:3::4").is_halted());
}

#[test]
fn test_provider_function_invoked_per_decision() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut gate = GateHandler::new(RawOptions::new().with_allow_provider(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        AllowData::Entries(vec!["1.2.3.4".into()])
    }));
    gate.init(StageConfig::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(!check(&gate, "1.2.3.4").is_halted());
    assert!(check(&gate, "1.2.3.5").is_halted());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// A module that provides an allow list and nothing else.
struct ListModule {
    entries: Vec<String>,
}

impl GateCapabilities for ListModule {
    fn allow_list(&self) -> Option<AllowProvider> {
        let entries = self.entries.clone();
        Some(Arc::new(move || {
            AllowData::Entries(entries.iter().map(|e| e.as_str().into()).collect())
        }))
    }
}

#[test]
fn test_module_provided_empty_list_blocks_everything() {
    let mut gate = GateHandler::new(
        RawOptions::new().with_module(Arc::new(ListModule { entries: vec![] })),
    );
    gate.init(StageConfig::new()).unwrap();

    assert!(check(&gate, "10.0.0.1").is_halted());
    assert!(check(&gate, "::1").is_halted());
}

#[test]
fn test_module_allow_list_overrides_explicit_allow() {
    let mut gate = GateHandler::new(
        RawOptions::new()
            .with_allow_list(["192.168.0.0/16"])
            .with_module(Arc::new(ListModule {
                entries: vec!["10.0.0.0/8".to_string()],
            })),
    );
    gate.init(StageConfig::new()).unwrap();

    // The module's list is authoritative; the explicit one is discarded.
    assert!(!check(&gate, "10.1.2.3").is_halted());
    assert!(check(&gate, "192.168.0.1").is_halted());
}

/// A module that provides a preferred blocked handler.
struct TeapotModule;

impl GateCapabilities for TeapotModule {
    fn allow_list(&self) -> Option<AllowProvider> {
        Some(Arc::new(|| AllowData::Delimited("10.0.0.0/24".to_string())))
    }

    fn blocked_handler(&self) -> Option<BlockedHandlerFn> {
        Some(Arc::new(|ctx, _options| ctx.respond(418, "teapot").halt()))
    }
}

#[test]
fn test_module_blocked_handler_overrides_explicit_handler() {
    let mut gate = GateHandler::new(
        RawOptions::new()
            .with_on_blocked(|ctx, _options| ctx.respond(500, "explicit").halt())
            .with_module(Arc::new(TeapotModule)),
    );
    gate.init(StageConfig::new()).unwrap();

    let ctx = check(&gate, "172.16.0.1");
    assert_eq!(ctx.response_code, Some(418));
    assert_eq!(ctx.response_body, Some("teapot".to_string()));
}

/// A stage that rejects everything it is handed, counting invocations.
struct RejectStage {
    initialized: bool,
    calls: Arc<AtomicUsize>,
}

impl StageContract for RejectStage {
    fn init(&mut self, _config: StageConfig) -> StageResult<()> {
        self.initialized = true;
        Ok(())
    }

    fn call(&self, ctx: RequestContext) -> StageResult<RequestContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ctx.respond(429, "try later").halt())
    }

    fn stop(&mut self) -> StageResult<()> {
        self.initialized = false;
        Ok(())
    }

    fn status(&self) -> StageStatus {
        if self.initialized {
            StageStatus::Running
        } else {
            StageStatus::Stopped
        }
    }
}

#[test]
fn test_blocked_requests_delegated_to_stage() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut gate = GateHandler::new(
        RawOptions::new()
            .with_allow_list(["10.0.0.0/24"])
            .with_on_blocked_stage(Box::new(RejectStage {
                initialized: false,
                calls: Arc::clone(&calls),
            })),
    );
    gate.init(StageConfig::new()).unwrap();

    assert!(!check(&gate, "10.0.0.1").is_halted());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let ctx = check(&gate, "172.16.0.1");
    assert!(ctx.is_halted());
    assert_eq!(ctx.response_code, Some(429));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_gate_as_boxed_stage() {
    // A host managing stages through the contract, not the concrete type.
    let mut stage: Box<dyn StageContract> =
        Box::new(GateHandler::new(RawOptions::new().with_allow_text("10.0.0.0/24, ::1")));

    stage
        .init(StageConfig::from_raw("response_body_on_blocked = \"denied\""))
        .unwrap();
    assert!(stage.heartbeat());

    assert!(!check(stage.as_ref(), "::1").is_halted());

    let ctx = check(stage.as_ref(), "8.8.8.8");
    assert!(ctx.is_halted());
    assert_eq!(ctx.response_body, Some("denied".to_string()));

    let metrics = stage.metrics();
    assert_eq!(metrics.counters.get("requests_checked"), Some(&2));

    stage.stop().unwrap();
    assert!(stage.status().is_stopped());
    assert!(stage.call(RequestContext::new().with_peer("::1")).is_err());
}

#[test]
fn test_declarative_config_end_to_end() {
    let mut gate = GateHandler::new(RawOptions::new());
    gate.init(StageConfig::from_raw(
        r#"
        allow = ["10.0.0.0/24", "192.168.1.1"]
        response_code_on_blocked = 403
        response_body_on_blocked = "Forbidden"
        "#,
    ))
    .unwrap();

    assert!(!check(&gate, "192.168.1.1").is_halted());

    let ctx = check(&gate, "192.168.1.2");
    assert_eq!(ctx.response_code, Some(403));
    assert_eq!(ctx.response_body, Some("Forbidden".to_string()));
}
