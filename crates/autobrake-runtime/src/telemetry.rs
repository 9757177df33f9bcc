//! Log and span output for the `autobrake` binary.
//!
//! Per-frame detail is at `debug`, brake changes and node lifecycle at
//! `info`, rejected scans at `warn`.  Three variables shape the output:
//!
//! - `RUST_LOG` filters (default `info`);
//! - `AUTOBRAKE_LOG_FORMAT=json` switches to one JSON object per line;
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` also ships spans to a collector over
//!   OTLP/HTTP.
//!
//! ```rust,no_run
//! let _guard = autobrake_runtime::telemetry::init_tracing("autobrake");
//! // ... run the node; spans are flushed when `_guard` drops.
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the OTel tracer every span is recorded under.
const TRACER_NAME: &str = "autobrake";

/// Console output style for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Parse an `AUTOBRAKE_LOG_FORMAT` value.  Anything other than `json`
    /// (case-insensitive) selects the compact formatter.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("AUTOBRAKE_LOG_FORMAT").ok().as_deref())
    }
}

/// Install the global subscriber for `service_name`.
///
/// Keep the returned guard alive until exit.  A second call leaves the
/// first subscriber in place and only reports it on stderr.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let format = LogFormat::from_env();

    let provider = build_provider(service_name);
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(TRACER_NAME)));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer);

    // `try_init` so a second call (tests, embedding) keeps the first subscriber.
    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };
    if let Err(e) = installed {
        eprintln!("[autobrake] tracing subscriber already set: {e}");
    }

    TracerProviderGuard(provider)
}

/// Owns the span exporter, if any; shutting it down on drop flushes spans.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// `true` when spans are being exported over OTLP.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("[autobrake] OpenTelemetry provider shutdown error: {e}");
            }
        }
    }
}

/// OTLP span pipeline, or `None` without an endpoint or on exporter failure.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[autobrake] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // No Tokio runtime exists yet when the CLI calls this.
            .with_simple_exporter(exporter)
            .build(),
    )
}
