//! Category and subcategory routes.
//!
//! The full category tree is served from [`CatalogCache`]; every write here
//! invalidates it.
//!
//! [`CatalogCache`]: crate::services::cache::CatalogCache

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use tracing::instrument;

use souq_core::{CategoryId, SubcategoryId};

use super::deleted;
use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryInput, Subcategory};
use crate::state::AppState;

fn category_not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

fn subcategory_not_found() -> AppError {
    AppError::NotFound("Subcategory not found".to_string())
}

// =============================================================================
// Categories
// =============================================================================

/// GET /categories
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    if let Some(categories) = state.cache().categories().await {
        return Ok(Json(categories));
    }

    let seen = state.cache().categories_generation();
    let categories = CategoryRepository::new(state.pool()).list().await?;
    state.cache().set_categories(seen, categories.clone()).await;
    Ok(Json(categories))
}

/// GET /categories/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(category_not_found)
}

/// POST /categories
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let input = input.validated()?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    state.cache().invalidate_categories().await;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/{id}
#[instrument(skip_all, fields(admin = %admin.sub, category_id = %id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Category>> {
    let input = input.validated()?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => category_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_categories().await;
    Ok(Json(category))
}

/// DELETE /categories/{id}
///
/// Subcategories go with it; products keep existing without a category.
#[instrument(skip_all, fields(admin = %admin.sub, category_id = %id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Value>> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => category_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_categories().await;
    Ok(deleted())
}

// =============================================================================
// Subcategories
// =============================================================================

/// GET /categories/{id}/subcategories
pub async fn subcategories(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Vec<Subcategory>>> {
    let repo = CategoryRepository::new(state.pool());
    if repo.get(id).await?.is_none() {
        return Err(category_not_found());
    }
    Ok(Json(repo.list_subcategories(id).await?))
}

/// POST /categories/{id}/subcategories
#[instrument(skip_all, fields(admin = %admin.sub, category_id = %id))]
pub async fn create_subcategory(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Subcategory>)> {
    let input = input.validated()?;
    let subcategory = CategoryRepository::new(state.pool())
        .create_subcategory(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => category_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_categories().await;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// GET /subcategories/{id}
pub async fn show_subcategory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubcategoryId>,
) -> Result<Json<Subcategory>> {
    CategoryRepository::new(state.pool())
        .get_subcategory(id)
        .await?
        .map(Json)
        .ok_or_else(subcategory_not_found)
}

/// PUT /subcategories/{id}
#[instrument(skip_all, fields(admin = %admin.sub, subcategory_id = %id))]
pub async fn update_subcategory(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubcategoryId>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Subcategory>> {
    let input = input.validated()?;
    let subcategory = CategoryRepository::new(state.pool())
        .update_subcategory(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => subcategory_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_categories().await;
    Ok(Json(subcategory))
}

/// DELETE /subcategories/{id}
#[instrument(skip_all, fields(admin = %admin.sub, subcategory_id = %id))]
pub async fn destroy_subcategory(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubcategoryId>,
) -> Result<Json<Value>> {
    CategoryRepository::new(state.pool())
        .delete_subcategory(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => subcategory_not_found(),
            other => other.into(),
        })?;
    state.cache().invalidate_categories().await;
    Ok(deleted())
}
