//! Readiness wiring for the booking server.

use super::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use futures::future::BoxFuture;
use slotbook_web::handlers::{ReadinessProbe, health::ReadinessResponse, readiness};
use sqlx::PgPool;

/// Pings `PostgreSQL` with `SELECT 1`.
#[derive(Clone, Debug)]
pub struct DatabaseProbe(pub PgPool);

impl ReadinessProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.0)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
    }
}

/// Readiness endpoint: runs every probe registered on the state.
///
/// ```bash
/// curl http://localhost:8080/ready
/// # {"ready":true,"checks":{"database":true}}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    readiness(&state.probes).await
}
