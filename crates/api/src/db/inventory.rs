//! Stock decrements for order fulfillment.
//!
//! A fulfillment runs in one transaction. Every decrement is guarded by
//! `stock >= quantity`, so a shortfall on any line rolls back all of them.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use souq_core::{ProductColorId, ProductId};

use super::RepositoryError;
use crate::models::{FulfilledLine, FulfillmentLine};

/// Repository for inventory adjustments.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Decrement stock for every line, or for none of them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a product or color does not
    /// exist, `RepositoryError::Conflict` naming the product when stock is
    /// short, and `RepositoryError::Database` on query failure.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn fulfill(
        &self,
        lines: &[FulfillmentLine],
    ) -> Result<Vec<FulfilledLine>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut fulfilled = Vec::with_capacity(lines.len());

        for line in lines {
            let remaining_color_stock = match line.color_id {
                Some(color_id) => Some(
                    decrement_color(&mut tx, line.product_id, color_id, line.quantity).await?,
                ),
                None => None,
            };
            let remaining_stock = decrement_product(&mut tx, line.product_id, line.quantity).await?;

            fulfilled.push(FulfilledLine {
                product_id: line.product_id,
                color_id: line.color_id,
                quantity: line.quantity,
                remaining_stock,
                remaining_color_stock,
            });
        }

        tx.commit().await?;
        tracing::info!(lines = fulfilled.len(), "Order fulfilled");
        Ok(fulfilled)
    }
}

async fn decrement_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
) -> Result<i32, RepositoryError> {
    let remaining: Option<i32> = sqlx::query_scalar(
        r"
        UPDATE shop.product
        SET stock = stock - $2, updated_at = NOW()
        WHERE id = $1 AND stock >= $2
        RETURNING stock
        ",
    )
    .bind(product_id.as_i32())
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await?;

    match remaining {
        Some(stock) => Ok(stock),
        None => Err(shortfall(tx, product_id).await),
    }
}

async fn decrement_color(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    color_id: ProductColorId,
    quantity: i32,
) -> Result<i32, RepositoryError> {
    let remaining: Option<i32> = sqlx::query_scalar(
        r"
        UPDATE shop.product_color
        SET stock = stock - $3, updated_at = NOW()
        WHERE id = $1 AND product_id = $2 AND stock >= $3
        RETURNING stock
        ",
    )
    .bind(color_id.as_i32())
    .bind(product_id.as_i32())
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(stock) = remaining {
        return Ok(stock);
    }

    let color: Option<String> = sqlx::query_scalar(
        "SELECT name FROM shop.product_color WHERE id = $1 AND product_id = $2",
    )
    .bind(color_id.as_i32())
    .bind(product_id.as_i32())
    .fetch_optional(&mut **tx)
    .await?;

    match color {
        None => Err(RepositoryError::NotFound),
        Some(color) => {
            let product = product_name(tx, product_id).await?;
            Err(RepositoryError::Conflict(format!(
                "insufficient stock for {product} ({color})"
            )))
        }
    }
}

/// Explain why a guarded product decrement matched no row.
async fn shortfall(tx: &mut Transaction<'_, Postgres>, product_id: ProductId) -> RepositoryError {
    match product_name(tx, product_id).await {
        Ok(name) => RepositoryError::Conflict(format!("insufficient stock for {name}")),
        Err(e) => e,
    }
}

async fn product_name(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<String, RepositoryError> {
    sqlx::query_scalar("SELECT name FROM shop.product WHERE id = $1")
        .bind(product_id.as_i32())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
}
