use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

pub mod labels {
    pub const OUTCOME: &str = "outcome";
    pub const REASON: &str = "reason";
    pub const ERROR_TYPE: &str = "error_type";
    pub const VERSION: &str = "version";
}

#[derive(Clone)]
pub struct Metrics {
    pub connections_total: Counter<u64>,
    pub tls_handshake_errors_total: Counter<u64>,

    // JA3 gate
    pub ja3_decisions_total: Counter<u64>,
    pub ja3_rejections_total: Counter<u64>,

    pub errors_total: Counter<u64>,

    pub build_info: Gauge<u64>,
}

impl Metrics {
    fn new(meter: Meter) -> Self {
        Self {
            connections_total: meter
                .u64_counter("ja3_gate_connections_total")
                .with_description("Total number of connections accepted")
                .build(),
            tls_handshake_errors_total: meter
                .u64_counter("ja3_gate_tls_handshake_errors_total")
                .with_description("TLS handshakes that failed or timed out")
                .build(),
            ja3_decisions_total: meter
                .u64_counter("ja3_gate_decisions_total")
                .with_description("Gate decisions by outcome")
                .build(),
            ja3_rejections_total: meter
                .u64_counter("ja3_gate_rejections_total")
                .with_description("Requests rejected by the gate, by reason")
                .build(),
            errors_total: meter
                .u64_counter("ja3_gate_errors_total")
                .with_description("Request handling errors by type")
                .build(),
            build_info: meter
                .u64_gauge("ja3_gate_build_info")
                .with_description("Build information")
                .build(),
        }
    }

    pub fn record_decision(&self, outcome: &'static str) {
        self.ja3_decisions_total
            .add(1, &[KeyValue::new(labels::OUTCOME, outcome)]);
    }

    pub fn record_rejection(&self, reason: &'static str) {
        self.ja3_rejections_total
            .add(1, &[KeyValue::new(labels::REASON, reason)]);
    }

    pub fn record_error(&self, error_type: &'static str) {
        self.errors_total
            .add(1, &[KeyValue::new(labels::ERROR_TYPE, error_type)]);
    }

    fn set_build_info(&self) {
        self.build_info
            .record(1, &[KeyValue::new(labels::VERSION, env!("CARGO_PKG_VERSION"))]);
    }
}

/// Installs the Prometheus exporter as the global meter provider
pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("ja3-gate");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}
