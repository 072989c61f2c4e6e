//! Company routes.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use tracing::instrument;

use souq_core::CompanyId;

use super::deleted;
use crate::db::{CompanyRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{Company, CompanyInput};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Company not found".to_string())
}

/// GET /companies
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Company>>> {
    let companies = CompanyRepository::new(state.pool()).list().await?;
    Ok(Json(companies))
}

/// GET /companies/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CompanyId>,
) -> Result<Json<Company>> {
    CompanyRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST /companies
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CompanyInput>,
) -> Result<(StatusCode, Json<Company>)> {
    let input = input.validated()?;
    let company = CompanyRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// PUT /companies/{id}
#[instrument(skip_all, fields(admin = %admin.sub, company_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CompanyId>,
    ApiJson(input): ApiJson<CompanyInput>,
) -> Result<Json<Company>> {
    let input = input.validated()?;
    let company = CompanyRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;
    Ok(Json(company))
}

/// DELETE /companies/{id}
#[instrument(skip_all, fields(admin = %admin.sub, company_id = %id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CompanyId>,
) -> Result<Json<Value>> {
    CompanyRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;
    Ok(deleted())
}
