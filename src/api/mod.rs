//! API handlers for the lending REST endpoints

pub mod activity;
pub mod auth;
pub mod books;
pub mod borrowers;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    extract::FromRequest,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON request body; malformed or incomplete bodies are rejected as
/// `ErrorResponse` with a 400 status
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Borrowers
        .route("/borrowers", get(borrowers::list_borrowers))
        .route("/borrowers", post(borrowers::create_borrower))
        .route("/borrowers/:id", delete(borrowers::delete_borrower))
        .route("/borrowers/:id/activity", get(borrowers::get_borrower_activity))
        // Books (catalog)
        .route("/books", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/categories", get(books::list_categories))
        .route("/books/:id", get(books::get_book))
        // Loans
        .route("/loans", get(loans::list_loans))
        .route("/loans/borrow", post(loans::borrow))
        .route("/loans/return", post(loans::return_many))
        .route("/loans/:id/return", post(loans::return_loan))
        // Activity
        .route("/activity/summary", get(activity::get_summary))
        .route("/activity/details", get(activity::get_details))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
