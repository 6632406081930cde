//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`, plus optional span export
//! to an OpenTelemetry collector over OTLP/gRPC.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: `twitch_curator=info,tower_http=info`)
//! - `OTEL_ENABLED`: `true` or `1` turns on span export (default: off)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector address (default: http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: Reported service name (default: twitch-curator)
//!
//! ```ignore
//! let _guard = twitch_curator::init_telemetry();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_SERVICE_NAME: &str = "twitch-curator";

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "twitch_curator=info,tower_http=info,hyper=warn,h2=warn";

/// Flushes exported spans on drop. Hold it for the life of `main`.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("span exporter shutdown failed: {e}");
        }
    }
}

/// Span export settings.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Export spans over OTLP.
    pub enabled: bool,
    /// Collector address.
    pub otlp_endpoint: String,
    /// `service.name` resource attribute.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read the `OTEL_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            enabled: lookup("OTEL_ENABLED").map_or(defaults.enabled, |v| {
                matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1")
            }),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.otlp_endpoint),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
        }
    }
}

/// Install the global subscriber using `OTEL_*` and `RUST_LOG`.
#[must_use]
pub fn init() -> TelemetryGuard {
    init_with_config(TelemetryConfig::from_env())
}

/// Install the global subscriber.
///
/// An exporter that cannot be built is logged and skipped; console output
/// is always installed.
#[must_use]
pub fn init_with_config(config: TelemetryConfig) -> TelemetryGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let mut export_error = None;
    let provider = if config.enabled {
        match opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.otlp_endpoint)
            .build()
        {
            Ok(exporter) => Some(
                SdkTracerProvider::builder()
                    .with_batch_exporter(exporter)
                    .with_resource(
                        Resource::builder()
                            .with_service_name(config.service_name.clone())
                            .build(),
                    )
                    .build(),
            ),
            Err(e) => {
                export_error = Some(e.to_string());
                None
            }
        }
    } else {
        None
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    if let Some(error) = export_error {
        tracing::warn!(%error, endpoint = %config.otlp_endpoint, "Span export disabled");
    } else if provider.is_some() {
        tracing::info!(endpoint = %config.otlp_endpoint, "Exporting spans over OTLP");
    }

    TelemetryGuard { provider }
}
