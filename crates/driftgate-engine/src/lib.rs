//! driftgate Engine - Run orchestration layer
//!
//! Coordinates the drift pipeline end to end: resolves endpoint descriptors
//! into HTTP calls, probes for bumped API versions, classifies outcomes,
//! stages drift candidates into the approval store, and wires the approval
//! state machine to its external side effects (notification edits and the
//! detached post-approval rerun).

pub mod approval_service;
pub mod config;
pub mod executor;
pub mod http;
pub mod orchestrator;
pub mod prober;
pub mod render;
pub mod resolve;

pub use approval_service::ApprovalService;
pub use config::load_endpoints;
pub use executor::{EndpointExecutor, Execution};
pub use http::{HttpResponse, HttpTransport, PreparedRequest, ReqwestTransport};
pub use orchestrator::{Orchestrator, RunOptions};
pub use prober::probe_next_version;
pub use render::{render_report, MAX_BLOCKS_PER_PAGE};
pub use resolve::{Resolution, RunParams};
