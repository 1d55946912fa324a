//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{activity, auth, books, borrowers, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lending Ledger API",
        version = "0.1.0",
        description = "In-memory book lending tracker REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        // Borrowers
        borrowers::list_borrowers,
        borrowers::create_borrower,
        borrowers::delete_borrower,
        borrowers::get_borrower_activity,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::list_categories,
        // Loans
        loans::list_loans,
        loans::borrow,
        loans::return_loan,
        loans::return_many,
        // Activity
        activity::get_summary,
        activity::get_details,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterResponse,
            // Borrowers
            crate::models::borrower::BorrowerView,
            crate::models::borrower::RegisterBorrower,
            crate::models::borrower::Role,
            borrowers::DeleteResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookQuery,
            // Loans
            crate::models::borrow_log::BorrowLog,
            crate::models::borrow_log::BorrowRequest,
            crate::models::borrow_log::ReturnManyRequest,
            loans::BorrowResponse,
            loans::ReturnResponse,
            // Activity
            crate::models::activity::BorrowerSummary,
            crate::models::activity::BorrowerBookDetail,
            crate::models::activity::BorrowerActivity,
            crate::models::activity::AvailabilityDrift,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "borrowers", description = "Borrower management"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Loan management"),
        (name = "activity", description = "Borrower activity views")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
