//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::activity::AvailabilityDrift};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// "ready" or "inconsistent"
    pub status: String,
    pub version: String,
    pub active_loans: usize,
    pub overdue_loans: usize,
    /// Books whose availability counter disagrees with the ledger
    pub drifts: Vec<AvailabilityDrift>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint (audits availability counters against the ledger)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Availability counters drifted", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> AppResult<(StatusCode, Json<ReadinessResponse>)> {
    let drifts = state.services.activity.audit_availability()?;
    let active_loans = state.services.loans.count_active()?;
    let overdue_loans = state.services.loans.count_overdue()?;

    let (status, label) = if drifts.is_empty() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "inconsistent")
    };

    Ok((
        status,
        Json(ReadinessResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_loans,
            overdue_loans,
            drifts,
        }),
    ))
}
