//! Product color routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use souq_core::{ProductColorId, ProductId};

use super::deleted;
use crate::db::{ProductColorRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{ProductColor, ProductColorInput};
use crate::state::AppState;

/// Query for listing colors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorQuery {
    #[serde(alias = "product_id")]
    pub product_id: Option<ProductId>,
}

fn not_found() -> AppError {
    AppError::NotFound("Color not found".to_string())
}

fn map_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

/// GET /product-colors?productId=
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ColorQuery>,
) -> Result<Json<Vec<ProductColor>>> {
    let colors = ProductColorRepository::new(state.pool())
        .list(query.product_id)
        .await?;
    Ok(Json(colors))
}

/// GET /product-colors/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductColorId>,
) -> Result<Json<ProductColor>> {
    ProductColorRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST /product-colors
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductColorInput>,
) -> Result<(StatusCode, Json<ProductColor>)> {
    let input = input.validated()?;
    let color = ProductColorRepository::new(state.pool())
        .create(&input)
        .await?;
    Ok((StatusCode::CREATED, Json(color)))
}

/// PUT /product-colors/{id}
#[instrument(skip_all, fields(admin = %admin.sub, color_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductColorId>,
    ApiJson(input): ApiJson<ProductColorInput>,
) -> Result<Json<ProductColor>> {
    let input = input.validated()?;
    let color = ProductColorRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(map_not_found)?;
    Ok(Json(color))
}

/// DELETE /product-colors/{id}
#[instrument(skip_all, fields(admin = %admin.sub, color_id = %id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductColorId>,
) -> Result<Json<Value>> {
    ProductColorRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(map_not_found)?;
    Ok(deleted())
}
