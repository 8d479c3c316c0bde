//! Health check endpoints.
//!
//! Liveness never touches dependencies. Readiness runs every registered
//! [`ReadinessProbe`] and reports each one by name.

use axum::{Json, http::StatusCode};
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// A dependency that must be reachable before the service takes traffic.
pub trait ReadinessProbe: Send + Sync {
    /// Name reported in the readiness body
    fn name(&self) -> &'static str;

    /// Check the dependency. `Err` carries a reason for the logs.
    fn check(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// True if every probe passed
    pub ready: bool,
    /// Result per probe name
    pub checks: BTreeMap<&'static str, bool>,
}

/// Run every probe concurrently.
///
/// Returns 200 if all pass, 503 otherwise.
///
/// ```text
/// GET /ready
/// {"ready":true,"checks":{"database":true}}
/// ```
pub async fn readiness(probes: &[Arc<dyn ReadinessProbe>]) -> (StatusCode, Json<ReadinessResponse>) {
    let results = join_all(probes.iter().map(|probe| async move {
        let outcome = probe.check().await;
        if let Err(reason) = &outcome {
            tracing::warn!(probe = probe.name(), %reason, "Readiness probe failed");
        }
        (probe.name(), outcome.is_ok())
    }))
    .await;

    let checks: BTreeMap<&'static str, bool> = results.into_iter().collect();
    let ready = checks.values().all(|ok| *ok);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
