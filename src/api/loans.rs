//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::AppJson,
    error::AppResult,
    models::borrow_log::{BorrowLog, BorrowRequest, ReturnManyRequest},
};

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// One log per lent copy
    pub logs: Vec<BorrowLog>,
    /// Status message
    pub message: String,
}

/// Return response with loan details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Returned logs
    pub logs: Vec<BorrowLog>,
}

/// List all borrow logs, most recent first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "Borrow logs", body = Vec<BorrowLog>)
    )
)]
pub async fn list_loans(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BorrowLog>>> {
    let logs = state.services.loans.list_logs()?;
    Ok(Json(logs))
}

/// Borrow one or more copies of a book
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loans created", body = BorrowResponse),
        (status = 400, description = "Invalid count or loan period"),
        (status = 404, description = "Borrower or book not found"),
        (status = 422, description = "Not enough copies available")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let logs = state.services.loans.borrow(request)?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            message: format!("{} copies borrowed successfully", logs.len()),
            logs,
        }),
    ))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = Uuid, Path, description = "Borrow log ID")
    ),
    responses(
        (status = 200, description = "Copy returned (or already returned)", body = ReturnResponse),
        (status = 404, description = "Borrow log not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(log_id): Path<Uuid>,
) -> AppResult<Json<ReturnResponse>> {
    let log = state.services.loans.return_one(log_id)?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        logs: vec![log],
    }))
}

/// Return several copies a borrower holds of one book
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = ReturnManyRequest,
    responses(
        (status = 200, description = "Copies returned", body = ReturnResponse),
        (status = 400, description = "Invalid count"),
        (status = 422, description = "Not enough active loans")
    )
)]
pub async fn return_many(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<ReturnManyRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let logs = state.services.loans.return_many(request)?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        logs,
    }))
}
