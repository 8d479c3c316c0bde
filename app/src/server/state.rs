//! Application state for the booking HTTP server.

use crate::retry::RetryPolicy;
use slotbook_core::{BookingLedger, BookingService, Clock, EventDirectory, QueryFacade};
use slotbook_web::handlers::ReadinessProbe;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Booking commands (write side)
    pub service: BookingService,
    /// Rosters and dashboard counts (read side)
    pub queries: QueryFacade,
    /// Backoff applied to read-only queries on storage errors
    pub read_retry: RetryPolicy,
    /// Dependencies checked by `/ready`
    pub probes: Arc<Vec<Arc<dyn ReadinessProbe>>>,
}

impl AppState {
    /// Build the service and query facade over one ledger and directory.
    ///
    /// Reads are not retried and no readiness probes are registered until
    /// [`with_read_retry`](Self::with_read_retry) and
    /// [`with_probe`](Self::with_probe) say otherwise.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        directory: Arc<dyn EventDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service: BookingService::new(Arc::clone(&ledger), Arc::clone(&directory), clock),
            queries: QueryFacade::new(ledger, directory),
            read_retry: RetryPolicy::none(),
            probes: Arc::new(Vec::new()),
        }
    }

    /// Retry read-only queries with `policy`.
    #[must_use]
    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Register a readiness probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        Arc::make_mut(&mut self.probes).push(probe);
        self
    }
}
