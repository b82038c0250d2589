//! OpenTelemetry integration for session-booking
//!
//! Tracing and metrics export to an OTLP endpoint, plus the process-wide
//! tracing subscriber.

use crate::config::{LoggingConfig, OtelConfig};
use opentelemetry::{
    global,
    metrics::{noop::NoopMeterProvider, Counter, Histogram, Meter, MeterProvider as _},
    trace::TracerProvider as TracerProviderTrait,
    KeyValue,
};
use opentelemetry_sdk::{metrics::MeterProvider as SdkMeterProvider, trace::TracerProvider, Resource};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OpenTelemetry error types
#[derive(Debug, Error)]
pub enum OtelError {
    /// Failed to initialize tracer
    #[error("Failed to initialize tracer: {0}")]
    TracerInit(String),

    /// Failed to initialize meter
    #[error("Failed to initialize meter: {0}")]
    MeterInit(String),

    /// Failed to shutdown
    #[error("Failed to shutdown: {0}")]
    Shutdown(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Owner of the tracer and meter providers
pub struct OtelProvider {
    tracer_provider: Option<TracerProvider>,
    meter_provider: SdkMeterProvider,
    config: OtelConfig,
}

impl OtelProvider {
    pub fn new(config: &OtelConfig) -> Result<Self, OtelError> {
        let resource = Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]);

        let (tracer_provider, meter_provider) = if config.enabled {
            let endpoint = config.endpoint.as_ref().ok_or_else(|| {
                OtelError::Config("OTLP endpoint is required when enabled".into())
            })?;

            let tracer_provider = Self::init_tracer_provider(endpoint, &resource)?;
            let meter_provider = Self::init_meter_provider(endpoint, &resource)?;

            (Some(tracer_provider), meter_provider)
        } else {
            let meter_provider = SdkMeterProvider::builder().with_resource(resource).build();
            (None, meter_provider)
        };

        if let Some(ref tp) = tracer_provider {
            global::set_tracer_provider(tp.clone());
        }

        Ok(Self {
            tracer_provider,
            meter_provider,
            config: config.clone(),
        })
    }

    fn init_tracer_provider(
        endpoint: &str,
        resource: &Resource,
    ) -> Result<TracerProvider, OtelError> {
        use opentelemetry_otlp::WithExportConfig;
        use opentelemetry_sdk::runtime;
        use opentelemetry_sdk::trace::{Config, Sampler};

        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .build_span_exporter()
            .map_err(|e| OtelError::TracerInit(e.to_string()))?;

        let trace_config = Config::default()
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(resource.clone());

        Ok(TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_config(trace_config)
            .build())
    }

    fn init_meter_provider(
        endpoint: &str,
        resource: &Resource,
    ) -> Result<SdkMeterProvider, OtelError> {
        use opentelemetry_otlp::{MetricsExporterBuilder, WithExportConfig};
        use opentelemetry_sdk::metrics::reader::{
            DefaultAggregationSelector, DefaultTemporalitySelector,
        };
        use opentelemetry_sdk::{metrics::PeriodicReader, runtime};

        let exporter = MetricsExporterBuilder::from(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .build_metrics_exporter(
            Box::new(DefaultTemporalitySelector::new()),
            Box::new(DefaultAggregationSelector::new()),
        )
        .map_err(|e| OtelError::MeterInit(e.to_string()))?;

        let reader = PeriodicReader::builder(exporter, runtime::Tokio).build();

        Ok(SdkMeterProvider::builder()
            .with_resource(resource.clone())
            .with_reader(reader)
            .build())
    }

    /// Get a tracer from the provider, a no-op one when export is disabled
    pub fn tracer(&self, name: &'static str) -> opentelemetry_sdk::trace::Tracer {
        if let Some(ref tp) = self.tracer_provider {
            tp.tracer(name)
        } else {
            TracerProvider::builder().build().tracer(name)
        }
    }

    pub fn meter(&self) -> Meter {
        self.meter_provider.meter(self.config.service_name.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Flush pending spans and stop the metric reader
    pub fn shutdown(&self) -> Result<(), OtelError> {
        if let Err(e) = self.meter_provider.shutdown() {
            return Err(OtelError::Shutdown(format!(
                "Meter shutdown failed: {:?}",
                e
            )));
        }

        if let Some(ref tp) = self.tracer_provider {
            for result in tp.force_flush() {
                if let Err(e) = result {
                    return Err(OtelError::Shutdown(format!("Tracer flush failed: {:?}", e)));
                }
            }
        }

        Ok(())
    }
}

impl Drop for OtelProvider {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Application metrics for session-booking
pub struct Metrics {
    /// Login attempts by outcome
    pub logins_total: Counter<u64>,

    /// Registration attempts by outcome
    pub registrations_total: Counter<u64>,

    /// Session join and leave operations
    pub enrollments_total: Counter<u64>,

    /// Requests refused for missing authentication
    pub auth_rejections_total: Counter<u64>,

    /// Request processing duration in seconds
    pub request_duration: Histogram<f64>,
}

impl Metrics {
    pub fn new(meter: &Meter) -> Self {
        let logins_total = meter
            .u64_counter("session_booking_logins_total")
            .with_description("Total number of login attempts")
            .init();

        let registrations_total = meter
            .u64_counter("session_booking_registrations_total")
            .with_description("Total number of registration attempts")
            .init();

        let enrollments_total = meter
            .u64_counter("session_booking_enrollments_total")
            .with_description("Total number of session join and leave operations")
            .init();

        let auth_rejections_total = meter
            .u64_counter("session_booking_auth_rejections_total")
            .with_description("Total number of requests rejected as unauthenticated")
            .init();

        let request_duration = meter
            .f64_histogram("session_booking_request_duration_seconds")
            .with_description("Request processing duration in seconds")
            .init();

        Self {
            logins_total,
            registrations_total,
            enrollments_total,
            auth_rejections_total,
            request_duration,
        }
    }

    /// Metrics whose instruments discard every measurement
    pub fn noop() -> Self {
        Self::new(&NoopMeterProvider::new().meter("session-booking"))
    }

    pub fn record_login(&self, outcome: &str) {
        self.logins_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }

    pub fn record_registration(&self, outcome: &str) {
        self.registrations_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }

    pub fn record_enrollment(&self, action: &str) {
        self.enrollments_total
            .add(1, &[KeyValue::new("action", action.to_string())]);
    }

    pub fn record_auth_rejection(&self) {
        self.auth_rejections_total.add(1, &[]);
    }

    pub fn record_request_duration(&self, method: &str, status: u16, duration_secs: f64) {
        self.request_duration.record(
            duration_secs,
            &[
                KeyValue::new("method", method.to_string()),
                KeyValue::new("status", i64::from(status)),
            ],
        );
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the tracing subscriber
///
/// `logging.format` selects JSON lines (`json`) or human-readable output
/// (`pretty`). Spans are exported over OTLP when the provider is enabled.
pub fn init_tracing(otel: &OtelProvider, logging: &LoggingConfig) -> Result<(), OtelError> {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(parse_level(&logging.level));

    let otel_layer = otel
        .is_enabled()
        .then(|| tracing_opentelemetry::layer().with_tracer(otel.tracer("session-booking")));

    let (json_layer, pretty_layer) = if logging.format.eq_ignore_ascii_case("pretty") {
        (None, Some(tracing_subscriber::fmt::layer().pretty()))
    } else {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| OtelError::TracerInit(e.to_string()))
}
