//! Authentication routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::{AuthService, AuthSession};
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Exchange email and password for an access token.
///
/// POST /auth/login
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let session = auth.login(&req.email, &req.password).await?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(Json(session))
}

/// Create a customer account and sign it in.
///
/// POST /auth/register
#[instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthSession>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let session = auth.register(&req.email, &req.password, &req.name).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// The account behind the bearer token.
///
/// GET /auth/me
pub async fn me(
    RequireAuth(claims): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user_id = claims.user_id()?;
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}
