//! The options-resolution protocol.
//!
//! Raw options are normalized exactly once, at setup time, by
//! [`GateOptions::pack`]: literal allow data is parsed eagerly, dynamic
//! sources are wrapped as deferred work, and defaults are filled in. Per
//! decision, [`GateOptions::unpack`] resolves whatever was deferred into a
//! concrete [`BlockSet`]; static configuration passes through at the cost of
//! an `Arc` clone.

use std::fmt;
use std::sync::Arc;

use crate::pipeline::{RequestContext, StageConfig, StageContract};

use super::block_set::BlockSet;
use super::capability::{self, GateCapabilities};
use super::codec::{AllowData, AllowEntry};
use super::error::{GateError, GateResult};

/// Response code staged by the default blocked handler.
pub const DEFAULT_RESPONSE_CODE: u16 = 401;

/// Response body staged by the default blocked handler.
pub const DEFAULT_RESPONSE_BODY: &str = "Not Authenticated";

/// A zero-argument allow-list provider, invoked once per decision.
pub type AllowProvider = Arc<dyn Fn() -> AllowData + Send + Sync>;

/// A two-argument blocked handler: context and packed options in, context out.
pub type BlockedHandlerFn = Arc<dyn Fn(RequestContext, &GateOptions) -> RequestContext + Send + Sync>;

/// An allow list as supplied by the caller, before packing.
#[derive(Clone)]
pub enum AllowValue {
    /// Literal entries, parsed eagerly at pack time.
    Entries(Vec<AllowEntry>),

    /// A comma-delimited string, parsed eagerly at pack time.
    Delimited(String),

    /// A caller-supplied provider function, invoked per decision.
    Provider(AllowProvider),

    /// A module-bound provider function, invoked per decision.
    Bound(AllowProvider),
}

impl fmt::Debug for AllowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entries(entries) => f.debug_tuple("Entries").field(entries).finish(),
            Self::Delimited(text) => f.debug_tuple("Delimited").field(text).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
            Self::Bound(_) => f.write_str("Bound(..)"),
        }
    }
}

/// A blocked handler as supplied by the caller, before packing.
pub enum BlockedValue {
    /// An explicit two-argument handler function.
    Handler(BlockedHandlerFn),

    /// A module-bound handler function.
    Bound(BlockedHandlerFn),

    /// A pipeline stage to delegate blocked requests to.
    Stage(Box<dyn StageContract>),
}

impl fmt::Debug for BlockedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Bound(_) => f.write_str("Bound(..)"),
            Self::Stage(_) => f.write_str("Stage(..)"),
        }
    }
}

/// Raw gate options, as assembled by the caller.
///
/// Five keys are recognized; everything else about the gate's behavior is
/// derived from them at pack time.
#[derive(Default)]
pub struct RawOptions {
    /// A module exposing gate capabilities. Capabilities it provides
    /// override the explicit `allow` / `on_blocked` values below.
    pub module: Option<Arc<dyn GateCapabilities>>,

    /// The allow list: literal data or a provider function.
    pub allow: Option<AllowValue>,

    /// What to do with a blocked request. Defaults to staging the configured
    /// response and halting.
    pub on_blocked: Option<BlockedValue>,

    /// Response code for the default blocked handler.
    pub response_code_on_blocked: Option<u16>,

    /// Response body for the default blocked handler.
    pub response_body_on_blocked: Option<String>,
}

// Manual Debug since the module field is a trait object.
impl fmt::Debug for RawOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawOptions")
            .field("module", &self.module.is_some())
            .field("allow", &self.allow)
            .field("on_blocked", &self.on_blocked)
            .field("response_code_on_blocked", &self.response_code_on_blocked)
            .field("response_body_on_blocked", &self.response_body_on_blocked)
            .finish()
    }
}

impl RawOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capability module.
    #[must_use]
    pub fn with_module(mut self, module: Arc<dyn GateCapabilities>) -> Self {
        self.module = Some(module);
        self
    }

    /// Set the allow value directly.
    #[must_use]
    pub fn with_allow(mut self, allow: AllowValue) -> Self {
        self.allow = Some(allow);
        self
    }

    /// Set the allow list from a sequence of entries.
    #[must_use]
    pub fn with_allow_list<I, E>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<AllowEntry>,
    {
        self.allow = Some(AllowValue::Entries(
            entries.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Set the allow list from a comma-delimited string.
    #[must_use]
    pub fn with_allow_text(mut self, text: impl Into<String>) -> Self {
        self.allow = Some(AllowValue::Delimited(text.into()));
        self
    }

    /// Set the allow list from a provider function, invoked per decision.
    #[must_use]
    pub fn with_allow_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> AllowData + Send + Sync + 'static,
    {
        self.allow = Some(AllowValue::Provider(Arc::new(provider)));
        self
    }

    /// Set an explicit blocked handler.
    #[must_use]
    pub fn with_on_blocked<F>(mut self, handler: F) -> Self
    where
        F: Fn(RequestContext, &GateOptions) -> RequestContext + Send + Sync + 'static,
    {
        self.on_blocked = Some(BlockedValue::Handler(Arc::new(handler)));
        self
    }

    /// Delegate blocked requests to another pipeline stage.
    #[must_use]
    pub fn with_on_blocked_stage(mut self, stage: Box<dyn StageContract>) -> Self {
        self.on_blocked = Some(BlockedValue::Stage(stage));
        self
    }

    /// Set the response code for the default blocked handler.
    #[must_use]
    pub fn with_response_code_on_blocked(mut self, code: u16) -> Self {
        self.response_code_on_blocked = Some(code);
        self
    }

    /// Set the response body for the default blocked handler.
    #[must_use]
    pub fn with_response_body_on_blocked(mut self, body: impl Into<String>) -> Self {
        self.response_body_on_blocked = Some(body.into());
        self
    }
}

/// The allow source after packing.
#[derive(Clone)]
pub enum AllowSource {
    /// Parsed once at pack time; shared per decision without re-parsing.
    Static(Arc<BlockSet>),

    /// Caller-supplied function, invoked and parsed per decision.
    Deferred(AllowProvider),

    /// Module-bound function, invoked and parsed per decision.
    Bound(AllowProvider),
}

impl fmt::Debug for AllowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(set) => f.debug_tuple("Static").field(set).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Bound(_) => f.write_str("Bound(..)"),
        }
    }
}

/// The blocked handler after packing.
#[derive(Clone)]
pub enum BlockedHandler {
    /// Stage the configured response code/body and halt.
    Default,

    /// An explicit handler function.
    Callable(BlockedHandlerFn),

    /// A module-bound handler function.
    Bound(BlockedHandlerFn),

    /// A wrapped pipeline stage, initialized at pack time.
    Adapter(Arc<dyn StageContract>),
}

impl fmt::Debug for BlockedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Bound(_) => f.write_str("Bound(..)"),
            Self::Adapter(_) => f.write_str("Adapter(..)"),
        }
    }
}

/// Packed gate options: the result of one-time setup normalization.
///
/// Immutable after construction and safe to share across concurrent
/// decisions.
#[derive(Debug, Clone)]
pub struct GateOptions {
    /// The allow source.
    pub allow: AllowSource,

    /// The blocked handler.
    pub on_blocked: BlockedHandler,

    /// Response code for the default blocked handler.
    pub response_code_on_blocked: u16,

    /// Response body for the default blocked handler.
    pub response_body_on_blocked: String,
}

impl GateOptions {
    /// Normalize raw options into their packed form.
    ///
    /// Module capabilities are resolved first and override explicit values.
    /// Literal allow data is parsed here, exactly once; provider functions
    /// are deferred untouched. A blocked-handler stage is initialized here
    /// with an empty [`StageConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`GateError::MissingAllowConfiguration`] when no allow source
    /// is available, parse errors for malformed literal data, and
    /// [`GateError::ConfigError`] when a blocked-handler stage fails to
    /// initialize.
    pub fn pack(raw: RawOptions) -> GateResult<Self> {
        let raw = capability::resolve(raw);

        let allow = match raw.allow {
            Some(AllowValue::Entries(entries)) => {
                AllowSource::Static(Arc::new(BlockSet::parse(&AllowData::Entries(entries))?))
            },
            Some(AllowValue::Delimited(text)) => {
                AllowSource::Static(Arc::new(BlockSet::parse(&AllowData::Delimited(text))?))
            },
            Some(AllowValue::Provider(provider)) => AllowSource::Deferred(provider),
            Some(AllowValue::Bound(provider)) => AllowSource::Bound(provider),
            None => return Err(GateError::MissingAllowConfiguration),
        };

        let on_blocked = match raw.on_blocked {
            None => BlockedHandler::Default,
            Some(BlockedValue::Handler(handler)) => BlockedHandler::Callable(handler),
            Some(BlockedValue::Bound(handler)) => BlockedHandler::Bound(handler),
            Some(BlockedValue::Stage(mut stage)) => {
                stage.init(StageConfig::new()).map_err(|e| {
                    GateError::ConfigError(format!("blocked-handler stage init failed: {e}"))
                })?;
                BlockedHandler::Adapter(Arc::from(stage))
            },
        };

        Ok(Self {
            allow,
            on_blocked,
            response_code_on_blocked: raw.response_code_on_blocked.unwrap_or(DEFAULT_RESPONSE_CODE),
            response_body_on_blocked: raw
                .response_body_on_blocked
                .unwrap_or_else(|| DEFAULT_RESPONSE_BODY.to_string()),
        })
    }

    /// Replace a static allow source with its optimized equivalent.
    ///
    /// No-op for deferred sources; containment behavior is unchanged either
    /// way.
    #[must_use]
    pub fn optimize(mut self) -> Self {
        if let AllowSource::Static(set) = &self.allow {
            let optimized = set.optimize();
            self.allow = AllowSource::Static(Arc::new(optimized));
        }
        self
    }

    /// Resolve the packed options for one decision.
    ///
    /// A static source passes through without re-parsing. A deferred or
    /// bound source is invoked now and its result parsed; nothing is
    /// memoized, so every decision against a dynamic source sees fresh
    /// data.
    ///
    /// # Errors
    ///
    /// Propagates parse errors from data returned by a dynamic source.
    pub fn unpack(&self) -> GateResult<ResolvedOptions> {
        let allow = match &self.allow {
            AllowSource::Static(set) => Arc::clone(set),
            AllowSource::Deferred(provider) | AllowSource::Bound(provider) => {
                let data = provider.as_ref()();
                Arc::new(BlockSet::parse(&data)?)
            },
        };

        Ok(ResolvedOptions {
            allow,
            on_blocked: self.on_blocked.clone(),
            response_code_on_blocked: self.response_code_on_blocked,
            response_body_on_blocked: self.response_body_on_blocked.clone(),
        })
    }
}

/// Options resolved for one decision: every deferred part evaluated.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    /// The concrete allow list.
    pub allow: Arc<BlockSet>,

    /// The blocked handler.
    pub on_blocked: BlockedHandler,

    /// Response code for the default blocked handler.
    pub response_code_on_blocked: u16,

    /// Response body for the default blocked handler.
    pub response_body_on_blocked: String,
}
