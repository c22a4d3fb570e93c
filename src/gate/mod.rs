//! # Allow-list gate
//!
//! The address/CIDR matching engine and its configuration-resolution
//! protocol.
//!
//! ## Features
//!
//! - **IPv4 and IPv6 allow lists**: individual addresses and CIDR ranges
//! - **Static, deferred, and module-bound allow sources**: literal data is
//!   parsed once at setup; provider functions are invoked per decision
//! - **Capability resolution**: a caller module may supply the allow list
//!   and the blocked handler, overriding explicit options
//! - **Default-deny**: absent, empty, or unparseable input never passes
//!
//! ## Usage
//!
//! ```
//! use addrgate::gate::{GateHandler, RawOptions};
//! use addrgate::pipeline::{RequestContext, StageConfig, StageContract};
//!
//! let mut gate = GateHandler::new(RawOptions::new().with_allow_text("10.0.0.0/24, 1:2:3::4"));
//! gate.init(StageConfig::new()).unwrap();
//!
//! let verdict = gate.call(RequestContext::new().with_peer("10.0.0.200")).unwrap();
//! assert!(!verdict.is_halted());
//! ```

mod block_set;
mod capability;
mod codec;
mod config;
mod engine;
mod error;
mod handler;
mod options;

pub use block_set::BlockSet;
pub use capability::GateCapabilities;
pub use codec::{encode, parse_address, parse_cidr, parse_list, Address, AllowData, AllowEntry, CidrBlock};
pub use config::GateConfig;
pub use engine::{decide, decide_request};
pub use error::{GateError, GateResult};
pub use handler::{GateHandler, GateStats};
pub use options::{
    AllowProvider, AllowSource, AllowValue, BlockedHandler, BlockedHandlerFn, BlockedValue,
    GateOptions, RawOptions, ResolvedOptions, DEFAULT_RESPONSE_BODY, DEFAULT_RESPONSE_CODE,
};
