//! Handlers for the `/users` resource (login, registration).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use villa_db::models::user::UserResponse;

use crate::auth::jwt::TOKEN_VALIDITY_DAYS;
use crate::auth::RegistrationRequest;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/login
///
/// Every failure is a 401 with the same message.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut users = state.user_repo();
    let outcome = state
        .authenticator
        .login(&mut users, &input.username, &input.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_in: TOKEN_VALIDITY_DAYS * 24 * 60 * 60,
        user: outcome.user.into(),
    }))
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegistrationRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let mut users = state.user_repo();
    let user = state.registrar.register(&mut users, input).await?;
    Ok(Json(DataResponse { data: user.into() }))
}
