use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{ExporterBuildError, Protocol, SpanExporter};
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::collections::HashMap;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::env::default_filter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to build OTLP exporter")]
    OtlpExporter(#[from] ExporterBuildError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Failed to spawn HTTP client thread")]
    ThreadSpawn,

    #[error("Failed to set global subscriber")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Flushes buffered spans when dropped.
pub struct TelemetryGuard {
    tracer_provider: SdkTracerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let _ = self.tracer_provider.force_flush();
    }
}

const TRACER_NAME: &str = "st0x-trade-sync-tracer";

const HYPERDX_TRACES_ENDPOINT: &str = "https://in-otel.hyperdx.io/v1/traces";

/// Installs console logging plus span export to HyperDX. Both share one
/// filter: `RUST_LOG` when set, otherwise both crates at `log_level`.
pub fn setup_telemetry(
    api_key: String,
    service_name: &str,
    log_level: tracing::Level,
) -> Result<TelemetryGuard, TelemetryError> {
    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(hyperdx_exporter(api_key)?)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(log_level).into());

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(TRACER_NAME)));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(TelemetryGuard { tracer_provider })
}

fn hyperdx_exporter(api_key: String) -> Result<SpanExporter, TelemetryError> {
    // the blocking client owns a runtime and cannot be built on a tokio worker
    let http_client = std::thread::spawn(|| {
        reqwest::blocking::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| e.to_string())
    })
    .join()
    .map_err(|_| TelemetryError::ThreadSpawn)?
    .map_err(TelemetryError::HttpClient)?;

    Ok(SpanExporter::builder()
        .with_http()
        .with_http_client(http_client)
        .with_endpoint(HYPERDX_TRACES_ENDPOINT)
        .with_headers(HashMap::from([("authorization".to_string(), api_key)]))
        .with_protocol(Protocol::HttpBinary)
        .build()?)
}
