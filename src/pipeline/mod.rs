//! # Pipeline boundary
//!
//! The contract between this crate and the host request pipeline. A host
//! constructs a stage, calls [`StageContract::init`] once at setup, then
//! threads a [`RequestContext`] through [`StageContract::call`] for every
//! inbound request. Stages signal "stop processing" by halting the context;
//! honoring the halt is the host's job.

mod config;
mod context;
mod contract;
mod error;
mod status;

pub use config::StageConfig;
pub use context::{PeerAddr, RequestContext};
pub use contract::{MetricsPayload, StageContract};
pub use error::{StageError, StageResult};
pub use status::StageStatus;
