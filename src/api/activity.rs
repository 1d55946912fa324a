//! Borrower activity endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::activity::{BorrowerBookDetail, BorrowerSummary},
};

/// Loan counters per borrower, busiest first
#[utoipa::path(
    get,
    path = "/activity/summary",
    tag = "activity",
    responses(
        (status = 200, description = "Borrower summaries", body = Vec<BorrowerSummary>)
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowerSummary>>> {
    let summaries = state.services.activity.summary_by_borrower()?;
    Ok(Json(summaries))
}

/// Loans grouped by borrower and book
#[utoipa::path(
    get,
    path = "/activity/details",
    tag = "activity",
    responses(
        (status = 200, description = "Grouped loans", body = Vec<BorrowerBookDetail>)
    )
)]
pub async fn get_details(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowerBookDetail>>> {
    let details = state.services.activity.details_by_borrower_and_book()?;
    Ok(Json(details))
}
