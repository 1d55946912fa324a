//! Borrower management endpoints

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
    models::{
        activity::BorrowerActivity,
        borrower::{BorrowerView, RegisterBorrower},
    },
};

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// List borrowers ordered by name
#[utoipa::path(
    get,
    path = "/borrowers",
    tag = "borrowers",
    responses(
        (status = 200, description = "List of borrowers", body = Vec<BorrowerView>)
    )
)]
pub async fn list_borrowers(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowerView>>> {
    let borrowers = state.services.borrowers.list()?;
    Ok(Json(borrowers.iter().map(BorrowerView::from).collect()))
}

/// Register a borrower on their behalf
#[utoipa::path(
    post,
    path = "/borrowers",
    tag = "borrowers",
    request_body = RegisterBorrower,
    responses(
        (status = 201, description = "Borrower created", body = BorrowerView),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already registered")
    )
)]
pub async fn create_borrower(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<RegisterBorrower>,
) -> AppResult<(StatusCode, Json<BorrowerView>)> {
    let borrower = state.services.borrowers.register(request)?;
    Ok((StatusCode::CREATED, Json(borrower.into())))
}

/// Remove a borrower with no active loans
#[utoipa::path(
    delete,
    path = "/borrowers/{id}",
    tag = "borrowers",
    params(
        ("id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Borrower removed", body = DeleteResponse),
        (status = 404, description = "Borrower not found"),
        (status = 422, description = "Borrower has active loans")
    )
)]
pub async fn delete_borrower(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    state.services.borrowers.remove(id)?;
    Ok(Json(DeleteResponse { ok: true }))
}

/// Active loans and full history of one borrower
#[utoipa::path(
    get,
    path = "/borrowers/{id}/activity",
    tag = "borrowers",
    params(
        ("id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Borrower activity", body = BorrowerActivity),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn get_borrower_activity(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowerActivity>> {
    let activity = state.services.activity.borrower_activity(id)?;
    Ok(Json(activity))
}
