//! Logging and OpenTelemetry setup shared by the binaries.
//!
//! Console output always goes through a fmt layer. When
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans are also exported over OTLP/HTTP
//! and a periodic OTLP metrics exporter is installed as the global meter provider.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, metrics::SdkMeterProvider, trace::SdkTracerProvider};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt};

pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Tracer and meter providers exporting to one OTLP/HTTP collector.
#[derive(Debug)]
pub struct OtelProviders {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
}

impl OtelProviders {
    /// `endpoint` is the collector base URL, e.g. `http://localhost:4318`.
    pub fn build(service_name: &'static str, endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let resource = Resource::builder().with_service_name(service_name).build();

        let spans = SpanExporter::builder()
            .with_http()
            .with_endpoint(format!("{endpoint}/v1/traces"))
            .build()
            .context("Failed to build OTLP span exporter")?;

        let metrics = MetricExporter::builder()
            .with_http()
            .with_endpoint(format!("{endpoint}/v1/metrics"))
            .build()
            .context("Failed to build OTLP metric exporter")?;

        let tracer = SdkTracerProvider::builder()
            .with_batch_exporter(spans)
            .with_resource(resource.clone())
            .build();

        let meter = SdkMeterProvider::builder()
            .with_periodic_exporter(metrics)
            .with_resource(resource)
            .build();

        Ok(Self { tracer, meter })
    }

    fn shutdown(&self) {
        if let Err(e) = self.tracer.shutdown() {
            eprintln!("failed to shut down tracer provider: {e}");
        }
        if let Err(e) = self.meter.shutdown() {
            eprintln!("failed to shut down meter provider: {e}");
        }
    }
}

/// Flushes and shuts down the OTLP exporters when dropped.
#[must_use = "dropping the guard shuts down telemetry export"]
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    providers: Option<OtelProviders>,
}

impl TelemetryGuard {
    pub fn exports_otlp(&self) -> bool {
        self.providers.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(providers) = self.providers.take() {
            providers.shutdown();
        }
    }
}

/// Install the global `tracing` subscriber, plus OTLP export when configured.
///
/// Filter priority: `cli_filter`, then `RUST_LOG`, then `default_filter`.
/// If a subscriber is already installed the call only sets up the exporters.
pub fn init_tracing(
    service_name: &'static str,
    cli_filter: Option<&str>,
    default_filter: &str,
) -> Result<TelemetryGuard> {
    let providers = otlp_endpoint(std::env::var(OTLP_ENDPOINT_ENV).ok())
        .map(|endpoint| OtelProviders::build(service_name, &endpoint))
        .transpose()?;

    if let Some(p) = &providers {
        opentelemetry::global::set_tracer_provider(p.tracer.clone());
        opentelemetry::global::set_meter_provider(p.meter.clone());
    }

    let _ = subscriber(service_name, env_filter(cli_filter, default_filter), providers.as_ref()).try_init();

    Ok(TelemetryGuard { providers })
}

fn env_filter(cli_filter: Option<&str>, default_filter: &str) -> EnvFilter {
    match cli_filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    }
}

/// Blank values count as unset.
fn otlp_endpoint(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn subscriber(
    service_name: &'static str,
    filter: EnvFilter,
    providers: Option<&OtelProviders>,
) -> impl Subscriber + for<'a> LookupSpan<'a> + Send + Sync + use<> {
    let otel = providers.map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer.tracer(service_name)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel)
}
