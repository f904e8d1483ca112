//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a human-readable fmt subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    Ok(())
}

/// Initialize OpenTelemetry with stdout exporter for development.
///
/// Spans are exported to stdout alongside the fmt layer. Both layers respect
/// the `RUST_LOG` environment variable.
///
/// # Errors
///
/// Returns error if subscriber initialization fails.
#[cfg(feature = "otel")]
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::{
        Resource,
        trace::{RandomIdGenerator, Sampler, TracerProvider},
    };
    use opentelemetry_stdout::SpanExporter;

    let provider = TracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(Resource::default())
        .build();

    let tracer = provider.tracer("tollbooth");
    opentelemetry::global::set_tracer_provider(provider);

    let telemetry_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(EnvFilter::from_default_env());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Shutdown OpenTelemetry and flush pending spans.
///
/// Call this before application exit to ensure all spans are exported.
#[cfg(feature = "otel")]
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}
