//! Domain models shared by executor, prober, store, and notifier.

pub mod endpoint;
pub mod outcome;

pub use endpoint::{EndpointDescriptor, HttpMethod};
pub use outcome::{RunReport, TestOutcome, VersionSignal};
