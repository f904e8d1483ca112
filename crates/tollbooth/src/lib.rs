//! Tollbooth - resilient requests against quota-constrained HTTP APIs
//!
//! Tollbooth wraps every outbound call in a fixed protocol: consult a TTL
//! cache, wait for a permit from a per-minute/per-day rate limiter, send,
//! reconcile quota headers, and retry transient failures with exponential
//! backoff, all while honouring cancellation.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tollbooth::{Call, CallContext, Client, TtlClass};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tollbooth::init_tracing()?;
//!
//!     let client = Client::builder(std::env::var("API_KEY")?)
//!         .base_url("https://api.example.com/v1")
//!         .build()?;
//!
//!     let call = Call::get("manufacturers", "/manufacturers", TtlClass::Long);
//!     let payload: serde_json::Value = client.execute(&CallContext::new(), &call).await?;
//!     println!("{}", payload);
//!
//!     println!("{:?}", client.rate_limit_stats());
//!     client.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `otel` - OpenTelemetry stdout span exporter (`init_telemetry`)
//!
//! # Architecture
//!
//! - `tollbooth_error` - Error types
//! - `tollbooth_core` - Call context and tracing setup
//! - `tollbooth_cache` - TTL response cache
//! - `tollbooth_rate_limit` - Dual-window rate limiter
//! - `tollbooth_retry` - Retry classification and backoff
//! - `tollbooth_client` - Transport, executor and client
//!
//! This crate (`tollbooth`) re-exports everything for convenience.

pub use tollbooth_cache::*;
pub use tollbooth_client::*;
pub use tollbooth_core::*;
pub use tollbooth_error::*;
pub use tollbooth_rate_limit::*;
pub use tollbooth_retry::*;
