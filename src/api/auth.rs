//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::AppJson,
    error::{AppError, AppResult, ErrorCode},
    models::borrower::{BorrowerView, Principal, RegisterBorrower, Role},
};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Admin username, borrower username or borrower email
    pub username: String,
    pub password: String,
}

/// Login response. The client keeps this for its session.
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// Admin `{kind, username}` or borrower `{kind, ...profile}`
    #[schema(value_type = Object)]
    pub user: Principal,
    pub role: Role,
}

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: BorrowerView,
}

/// Register a new borrower account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterBorrower,
    responses(
        (status = 201, description = "Borrower registered", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email or username already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<RegisterBorrower>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let borrower = state.services.borrowers.register(request)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: borrower.into(),
        }),
    ))
}

/// Authenticate as admin or borrower
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Username and password required"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidArgument(
            ErrorCode::BadValue,
            "Username and password required".to_string(),
        ));
    }

    let auth = state
        .services
        .borrowers
        .authenticate(&request.username, &request.password)?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    Ok(Json(LoginResponse {
        success: true,
        user: auth.principal,
        role: auth.role,
    }))
}
