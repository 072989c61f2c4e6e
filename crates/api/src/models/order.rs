//! Fulfillment request and receipt.

use serde::{Deserialize, Serialize};

use souq_core::{ProductColorId, ProductId};

use super::ValidationError;

/// One line of an order to fulfill.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentLine {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
    #[serde(default, alias = "color_id")]
    pub color_id: Option<ProductColorId>,
    pub quantity: i32,
}

/// Body of `POST /orders/fulfill`.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentRequest {
    pub lines: Vec<FulfillmentLine>,
}

impl FulfillmentRequest {
    /// Reject empty orders and non-positive quantities.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first bad line.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::new("order has no lines"));
        }
        if let Some(line) = self.lines.iter().find(|l| l.quantity <= 0) {
            return Err(ValidationError::new(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }
        Ok(self)
    }
}

/// Stock left after a line was fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfilledLine {
    pub product_id: ProductId,
    pub color_id: Option<ProductColorId>,
    pub quantity: i32,
    pub remaining_stock: i32,
    /// Remaining stock of the color, when the line named one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_color_stock: Option<i32>,
}
