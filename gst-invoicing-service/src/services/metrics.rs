//! Prometheus export and the invoicing counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics handle already initialized");
    }
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_invoice_created(status: &str) {
    counter!("gst_invoices_created_total", "status" => status.to_string()).increment(1);
}

/// `reason` is one of `scan_failed`, `sequence_exhausted`, `collision`, `lookup_failed`
/// or `duplicate_retry`.
pub fn record_number_fallback(reason: &'static str) {
    counter!("gst_invoice_number_fallbacks_total", "reason" => reason).increment(1);
}

pub fn record_invoice_deleted() {
    counter!("gst_invoices_deleted_total").increment(1);
}
