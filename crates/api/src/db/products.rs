//! Product repository.
//!
//! Products are always returned with their colors and the derived `is_new`
//! flag. Listing fetches colors for the whole page in one extra query.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use souq_core::catalog::{is_new, new_product_window};
use souq_core::{CategoryId, CompanyId, ProductColorId, ProductId, SubcategoryId};

use super::product_colors::{COLOR_COLUMNS, ProductColorRow};
use super::{RepositoryError, map_write_error};
use crate::models::{ColorStock, Product, ProductColor, ProductFilter, ProductInput, StockLevel};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    image: Option<String>,
    hover_image: Option<String>,
    category_id: Option<i32>,
    subcategory_id: Option<i32>,
    company_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, colors: Vec<ProductColor>, now: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
            hover_image: self.hover_image,
            category_id: self.category_id.map(CategoryId::new),
            subcategory_id: self.subcategory_id.map(SubcategoryId::new),
            company_id: self.company_id.map(CompanyId::new),
            is_new: is_new(self.created_at, now),
            colors,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: Option<i32>,
    name: Option<String>,
    color_stock: Option<i32>,
    product_stock: i32,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, image, hover_image, \
     category_id, subcategory_id, company_id, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let now = Utc::now();
        let new_since = filter.new_only.then(|| now - new_product_window());

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM shop.product
            WHERE ($1::INTEGER IS NULL OR category_id = $1)
              AND ($2::INTEGER IS NULL OR subcategory_id = $2)
              AND ($3::INTEGER IS NULL OR company_id = $3)
              AND ($4::TEXT IS NULL OR name ILIKE $4)
              AND ($5::TIMESTAMPTZ IS NULL OR (created_at > $5 AND created_at <= $6))
            ORDER BY created_at DESC, id DESC
            LIMIT $7 OFFSET $8
            "
        ))
        .bind(filter.category_id.map(|id| id.as_i32()))
        .bind(filter.subcategory_id.map(|id| id.as_i32()))
        .bind(filter.company_id.map(|id| id.as_i32()))
        .bind(filter.name_pattern())
        .bind(new_since)
        .bind(now)
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut colors = self.colors_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_colors = colors.remove(&row.id).unwrap_or_default();
                row.into_product(product_colors, now)
            })
            .collect())
    }

    /// Get a product with its colors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let colors = self
            .colors_for(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(row.into_product(colors, Utc::now())))
    }

    /// Current stock of a product and its colors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock(&self, id: ProductId) -> Result<Option<StockLevel>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockRow>(
            r"
            SELECT c.id, c.name, c.stock AS color_stock, p.stock AS product_stock
            FROM shop.product p
            LEFT JOIN shop.product_color c ON c.product_id = p.id
            WHERE p.id = $1
            ORDER BY c.name, c.id
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let product_stock = first.product_stock;

        let colors = rows
            .into_iter()
            .filter_map(|row| {
                Some(ColorStock {
                    id: ProductColorId::new(row.id?),
                    name: row.name?,
                    stock: row.color_stock?,
                })
            })
            .collect();

        Ok(Some(StockLevel {
            product_id: id,
            stock: product_stock,
            colors,
        }))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced category,
    /// subcategory or company does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (name, description, price, stock, image, hover_image,
                 category_id, subcategory_id, company_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image.as_deref())
        .bind(input.hover_image.as_deref())
        .bind(input.category_id.map(|id| id.as_i32()))
        .bind(input.subcategory_id.map(|id| id.as_i32()))
        .bind(input.company_id.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        Ok(row.into_product(Vec::new(), Utc::now()))
    }

    /// Replace a product's fields. Colors are managed separately.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID and
    /// `RepositoryError::Conflict` for dangling references.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, stock = $5, image = $6,
                hover_image = $7, category_id = $8, subcategory_id = $9,
                company_id = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image.as_deref())
        .bind(input.hover_image.as_deref())
        .bind(input.category_id.map(|id| id.as_i32()))
        .bind(input.subcategory_id.map(|id| id.as_i32()))
        .bind(input.company_id.map(|id| id.as_i32()))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?
        .ok_or(RepositoryError::NotFound)?;

        let colors = self
            .colors_for(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(row.into_product(colors, Utc::now()))
    }

    /// Delete a product and, by cascade, its colors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Colors of the given products, grouped by product ID.
    async fn colors_for(
        &self,
        product_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ProductColor>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProductColorRow>(&format!(
            "SELECT {COLOR_COLUMNS} FROM shop.product_color WHERE product_id = ANY($1) ORDER BY name, id"
        ))
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<ProductColor>> = HashMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}
