//! Authentication handlers for the Plaza web API.
//!
//! Registration lives in the hosting application; this core only mints
//! and introspects the tokens its own contracts consume.

use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa;
use validator::Validate;

use crate::auth::{issue_token, verify_password};
use crate::db::UserRepository;
use crate::mail::MailService;
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, MeResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/auth/login - Authenticate and issue an access token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user_repo = UserRepository::new(state.db.pool());
    let user = user_repo
        .get_by_username(&req.username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::internal("Login failed")
        })?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let verified = verify_password(&req.password, &user.password).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        ApiError::internal("Login failed")
    })?;
    if !verified {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&state.jwt_secret, state.token_expiry_secs, &user).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        ApiError::internal("Login failed")
    })?;

    tracing::info!("User {} logged in", user.username);

    Ok(Json(ApiResponse::new(LoginResponse {
        token,
        user: user.summary(),
    })))
}

/// GET /api/auth/me - Current identity with unread mail count.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user_repo = UserRepository::new(state.db.pool());
    let user = user_repo
        .get_active_by_id(claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::internal("Lookup failed")
        })?
        .ok_or_else(|| ApiError::unauthorized("Account no longer active"))?;

    let unread_count = MailService::new(state.db.pool())
        .unread_count(user.id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(MeResponse {
        user: user.summary(),
        unread_count,
    })))
}
