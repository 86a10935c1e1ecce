//! Metrics collection for faceforge-service.
//!
//! HTTP-level metrics come from the shared middleware; this module adds
//! per-operation dispatch outcomes and provider latency.

use crate::models::ProcessType;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const DISPATCH_TOTAL: &str = "faceforge_dispatch_total";
pub const PROVIDER_DURATION: &str = "faceforge_provider_duration_seconds";
pub const REJECTED_TOTAL: &str = "faceforge_rejected_requests_total";

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of one provider dispatch.
pub fn record_dispatch(process_type: &str, outcome: &str, elapsed: Duration) {
    let labels = [
        ("process_type", process_type.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(DISPATCH_TOTAL, &labels).increment(1);
    histogram!(PROVIDER_DURATION, "process_type" => process_type.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record a request rejected before reaching a provider.
pub fn record_rejection(process_type: Option<ProcessType>, reason: &str) {
    let process_type = process_type.map(ProcessType::as_str).unwrap_or("unknown");
    counter!(
        REJECTED_TOTAL,
        "process_type" => process_type,
        "reason" => reason.to_string()
    )
    .increment(1);
}
