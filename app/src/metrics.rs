//! Business metrics for the booking server.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `slotbook_bookings_total{outcome}` - Booking attempts by outcome
//!   (`created`, `attendee_conflict`, `company_conflict`, `error`)
//! - `slotbook_cancellations_total` - Bookings cancelled
//! - `slotbook_ledger_errors_total{op}` - Failed ledger queries by operation

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Register descriptions for all business metrics.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "slotbook_bookings_total",
        "Booking attempts by outcome (created, attendee_conflict, company_conflict, error)"
    );
    describe_counter!(
        "slotbook_cancellations_total",
        "Total number of bookings cancelled"
    );
    describe_counter!(
        "slotbook_ledger_errors_total",
        "Failed ledger queries by operation"
    );

    tracing::info!("Business metrics registered");
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// # Errors
///
/// Returns [`BuildError`] if a recorder is already installed or the
/// listener cannot be set up.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_business_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
