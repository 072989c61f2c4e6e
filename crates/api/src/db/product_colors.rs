//! Product color repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use souq_core::{ProductColorId, ProductId};

use super::{RepositoryError, map_write_error};
use crate::models::{ProductColor, ProductColorInput};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductColorRow {
    id: i32,
    pub(super) product_id: i32,
    name: String,
    hex_code: Option<String>,
    image: Option<String>,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductColorRow> for ProductColor {
    fn from(row: ProductColorRow) -> Self {
        Self {
            id: ProductColorId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            hex_code: row.hex_code,
            image: row.image,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) const COLOR_COLUMNS: &str =
    "id, product_id, name, hex_code, image, stock, created_at, updated_at";

/// Repository for product color variants.
pub struct ProductColorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductColorRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List colors, optionally restricted to one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<ProductColor>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductColorRow>(&format!(
            r"
            SELECT {COLOR_COLUMNS} FROM shop.product_color
            WHERE ($1::INTEGER IS NULL OR product_id = $1)
            ORDER BY product_id, name, id
            "
        ))
        .bind(product_id.map(|id| id.as_i32()))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductColor::from).collect())
    }

    /// Get a color by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductColorId) -> Result<Option<ProductColor>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductColorRow>(&format!(
            "SELECT {COLOR_COLUMNS} FROM shop.product_color WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductColor::from))
    }

    /// Create a color.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product already has a color
    /// with this name or the product does not exist.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, name = %input.name))]
    pub async fn create(&self, input: &ProductColorInput) -> Result<ProductColor, RepositoryError> {
        let row = sqlx::query_as::<_, ProductColorRow>(&format!(
            r"
            INSERT INTO shop.product_color (product_id, name, hex_code, image, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLOR_COLUMNS}
            "
        ))
        .bind(input.product_id.as_i32())
        .bind(&input.name)
        .bind(input.hex_code.as_deref())
        .bind(input.image.as_deref())
        .bind(input.stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "color"))?;

        Ok(row.into())
    }

    /// Replace a color's fields (it may move to another product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no color has this ID.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductColorId,
        input: &ProductColorInput,
    ) -> Result<ProductColor, RepositoryError> {
        let row = sqlx::query_as::<_, ProductColorRow>(&format!(
            r"
            UPDATE shop.product_color
            SET product_id = $2, name = $3, hex_code = $4, image = $5, stock = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLOR_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(input.product_id.as_i32())
        .bind(&input.name)
        .bind(input.hex_code.as_deref())
        .bind(input.image.as_deref())
        .bind(input.stock)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "color"))?;

        row.map(ProductColor::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a color.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no color has this ID.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductColorId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product_color WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
