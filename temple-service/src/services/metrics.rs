//! Prometheus metrics for temple-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec,
    HistogramVec, IntCounter, TextEncoder,
};
use std::sync::OnceLock;

/// Recorder for the `metrics` facade used by the HTTP middleware.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Payment confirmations by outcome (submitted, edited, approved, rejected).
pub static PAYMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "temple_payments_total",
        "Payment confirmations by workflow outcome",
        &["outcome"]
    )
    .expect("Failed to register payments_total")
});

/// Receipts issued.
pub static RECEIPTS_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("temple_receipts_issued_total", "Receipts minted on approval")
        .expect("Failed to register receipts_issued")
});

/// Receipts cancelled.
pub static RECEIPTS_CANCELLED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("temple_receipts_cancelled_total", "Receipts marked void")
        .expect("Failed to register receipts_cancelled")
});

/// Approved amount (smallest currency unit).
pub static DONATED_AMOUNT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "temple_donated_amount_total",
        "Sum of approved donation amounts"
    )
    .expect("Failed to register donated_amount")
});

/// Admin balance overrides.
pub static BALANCE_ADJUSTMENTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "temple_balance_adjustments_total",
        "Direct admin overrides of the account balance"
    )
    .expect("Failed to register balance_adjustments")
});

/// Domain errors by kind.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "temple_errors_total",
        "Total number of errors by type",
        &["operation", "error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Storage operation duration histogram.
pub static STORE_OPERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "temple_store_operation_duration_seconds",
        "Storage operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register store_operation_duration")
});

/// Install the HTTP recorder and force the domain metrics. Safe to call more
/// than once.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_none() {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!("Prometheus recorder not installed: {}", e),
        }
    }

    Lazy::force(&PAYMENTS_TOTAL);
    Lazy::force(&RECEIPTS_ISSUED);
    Lazy::force(&RECEIPTS_CANCELLED);
    Lazy::force(&DONATED_AMOUNT);
    Lazy::force(&BALANCE_ADJUSTMENTS);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&STORE_OPERATION_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    output.push_str(&encoder.encode_to_string(&metric_families).unwrap_or_default());
    output
}
