//! # addrgate
//!
//! An IP/CIDR allow-list gate for modular gateway pipelines.
//!
//! The gate decides, for an inbound request, whether the originating address
//! is permitted by a configured allow list of individual addresses and CIDR
//! ranges. Configuration may be supplied as static data, as lazily-evaluated
//! provider functions, or as capabilities exposed by a caller module; all
//! three forms are normalized once at setup time and any deferred work is
//! paid for per decision, not per entry.
//!
//! ## Architecture
//!
//! The crate is split in two:
//!
//! - [`pipeline`] defines the boundary with the host: the
//!   [`pipeline::StageContract`] lifecycle trait, the
//!   [`pipeline::RequestContext`] value that flows between stages, and the
//!   raw configuration carrier.
//! - [`gate`] is the engine: address/CIDR parsing, block-set containment,
//!   capability resolution, the pack/unpack options protocol, and the
//!   [`gate::GateHandler`] stage that ties them together.
//!
//! ## Example
//!
//! ```
//! use addrgate::gate::{GateHandler, RawOptions};
//! use addrgate::pipeline::{RequestContext, StageConfig, StageContract};
//!
//! let mut gate = GateHandler::new(
//!     RawOptions::new().with_allow_list(["10.0.0.0/24", "192.168.1.1"]),
//! );
//! gate.init(StageConfig::new()).unwrap();
//!
//! let ctx = gate.call(RequestContext::new().with_peer("10.0.0.7")).unwrap();
//! assert!(!ctx.is_halted());
//!
//! let ctx = gate.call(RequestContext::new().with_peer("172.16.0.1")).unwrap();
//! assert!(ctx.is_halted());
//! assert_eq!(ctx.response_code, Some(401));
//! ```

pub mod gate;
pub mod pipeline;
