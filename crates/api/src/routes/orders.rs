//! Order fulfillment.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::InventoryRepository;
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::{FulfilledLine, FulfillmentRequest};
use crate::state::AppState;

/// Fulfillment result.
#[derive(Debug, Serialize)]
pub struct FulfillmentResponse {
    pub success: bool,
    pub lines: Vec<FulfilledLine>,
}

/// Decrement stock for every line of an order, atomically.
///
/// POST /orders/fulfill
///
/// A shortfall on any line rejects the whole order with 409 and leaves all
/// stock untouched.
#[instrument(skip_all, fields(admin = %admin.sub))]
pub async fn fulfill(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FulfillmentRequest>,
) -> Result<Json<FulfillmentResponse>> {
    let request = request.validated()?;
    let lines = InventoryRepository::new(state.pool())
        .fulfill(&request.lines)
        .await?;

    Ok(Json(FulfillmentResponse {
        success: true,
        lines,
    }))
}
