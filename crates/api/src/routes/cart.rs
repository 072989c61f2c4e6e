//! Add-to-cart stock check.
//!
//! The cart itself lives in the browser. The client posts its current lines
//! with the item to add; the server reads stock once, applies the merge rules
//! from [`souq_core::Cart`] and returns the new cart, or the unchanged cart
//! with the quantity still available.
//!
//! Messages are shown to shoppers as-is, so they are in Arabic.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use souq_core::{Cart, CartError, CartItem};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

const MSG_ADDED: &str = "تمت إضافة المنتج إلى السلة";
const MSG_OUT_OF_STOCK: &str = "عذراً، هذا المنتج غير متوفر حالياً";
const MSG_INVALID_QUANTITY: &str = "الكمية يجب أن تكون 1 على الأقل";
const MSG_PRODUCT_NOT_FOUND: &str = "المنتج غير موجود";

/// Body of `POST /cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    /// Lines already in the browser cart.
    #[serde(default)]
    pub cart: Vec<CartItem>,
    pub item: CartItem,
}

/// Outcome of an add. `available` is only present on rejection.
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    pub cart: Cart,
}

/// Add an item to a client-held cart if stock allows.
///
/// POST /cart/add
#[instrument(skip_all, fields(product_id = %request.item.product_id, quantity = request.item.quantity))]
pub async fn add(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>> {
    if request.item.quantity == 0 {
        return Err(AppError::BadRequest(MSG_INVALID_QUANTITY.to_string()));
    }

    let level = ProductRepository::new(state.pool())
        .stock(request.item.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_PRODUCT_NOT_FOUND.to_string()))?;
    let available = level.available_for(request.item.color_name.as_deref());

    let mut cart = Cart::from_items(request.cart);
    let response = match cart.add(request.item, available) {
        Ok(_) => AddToCartResponse {
            success: true,
            message: MSG_ADDED.to_string(),
            available: None,
            cart,
        },
        Err(CartError::InsufficientStock { available, in_cart }) => AddToCartResponse {
            success: false,
            message: shortfall_message(available, in_cart),
            available: Some(available),
            cart,
        },
        Err(CartError::InvalidQuantity | CartError::NotInCart) => {
            return Err(AppError::BadRequest(MSG_INVALID_QUANTITY.to_string()));
        }
    };

    Ok(Json(response))
}

/// Explain a rejected add: nothing in stock, or how many more fit.
fn shortfall_message(available: u32, in_cart: u32) -> String {
    if available == 0 {
        return MSG_OUT_OF_STOCK.to_string();
    }
    let remaining = available.saturating_sub(in_cart);
    if remaining == 0 {
        format!("لديك بالفعل كل الكمية المتوفرة ({available}) في السلة")
    } else {
        format!("الكمية المتوفرة {available} فقط، ويمكنك إضافة {remaining} أخرى")
    }
}
