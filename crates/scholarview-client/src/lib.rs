//! Scholarview Client - progressive acquisition of a profile's publications
//!
//! Talks to the profile backend over HTTP: polls readiness, takes either a
//! cached JSON answer or follows the redirect to a server-sent-event stream,
//! accumulates progress, and publishes the final result.

pub mod accumulator;
pub mod controller;
pub mod error;
pub mod http;
pub mod readiness;
pub mod sse;
pub mod transport;
pub mod update;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use accumulator::ProgressAccumulator;
pub use controller::{AcquisitionController, ControllerState, RefreshOutcome};
pub use error::ClientError;
pub use http::{CONNECT_TIMEOUT, DEFAULT_BASE_URL, HttpTransport};
pub use readiness::{DEFAULT_RETRY_DELAY, ReadinessPolicy, wait_until_ready};
pub use transport::{Acquisition, EventStream, StreamHandle, Transport};
pub use update::request_update;
pub use wire::{CacheStatus, ServerStatus, StreamEvent, UpdateOutcome};
