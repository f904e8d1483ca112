//! Resilient request execution for rate-limited, quota-constrained HTTP APIs.
//!
//! Every call made through a [`Client`]:
//! 1. is answered from the response cache when a fresh entry exists,
//! 2. otherwise waits for a permit from the dual-window rate limiter,
//! 3. goes over the [`Transport`] once per attempt,
//! 4. feeds quota headers and `Retry-After` back into the limiter,
//! 5. is retried with exponential backoff while failures stay transient,
//! 6. has its payload checked for embedded service errors, decoded and cached.
//!
//! Cancellation and deadlines travel in a
//! [`CallContext`](tollbooth_core::CallContext) and are honoured at every wait.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod client;
mod config;
mod executor;
mod transport;

pub use call::{CachePolicy, Call};
pub use client::{Client, ClientBuilder};
pub use config::{TollboothConfig, TransportConfig, TransportConfigBuilder};
pub use executor::Executor;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
