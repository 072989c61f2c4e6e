//! Product routes.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use tracing::instrument;

use souq_core::ProductId;

use super::deleted;
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductFilter, ProductInput, StockLevel};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

fn map_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    }
}

/// List products, newest first.
///
/// GET /products?categoryId=&subcategoryId=&companyId=&q=&newOnly=&limit=&offset=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Current stock of the product and each color.
///
/// GET /products/{id}/stock
pub async fn stock(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<StockLevel>> {
    ProductRepository::new(state.pool())
        .stock(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST /products
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = input.validated()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
#[instrument(skip_all, fields(admin = %admin.sub, product_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>> {
    let input = input.validated()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(map_not_found)?;
    Ok(Json(product))
}

/// DELETE /products/{id}
#[instrument(skip_all, fields(admin = %admin.sub, product_id = %id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Value>> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(map_not_found)?;
    Ok(deleted())
}
