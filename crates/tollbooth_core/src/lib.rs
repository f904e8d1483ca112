//! Shared plumbing for the Tollbooth request pipeline.
//!
//! - [`CallContext`] propagates cancellation and deadlines through every
//!   suspension point of a call.
//! - [`instant_after`] adds durations to instants without overflow.
//! - [`init_tracing`] installs the workspace's tracing subscriber.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod telemetry;
mod time;

pub use context::CallContext;
#[cfg(feature = "otel")]
pub use telemetry::{init_telemetry, shutdown_telemetry};
pub use telemetry::init_tracing;
pub use time::{FAR_FUTURE, instant_after};
