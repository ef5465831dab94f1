pub mod accounts;
pub mod operations;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::health::{check_health, HealthResponse, IdempotencyChecker, LedgerStoreChecker};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Ledger store is unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = check_health(
        LedgerStoreChecker::new(state.store.clone()),
        IdempotencyChecker::new(state.idempotency.clone()),
        state.start_time,
    )
    .await;

    let status_code = if report.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(report))
}
