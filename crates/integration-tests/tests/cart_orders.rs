//! Integration tests for the cart stock check and order fulfillment.
//!
//! Requires a running API and admin credentials; see the crate docs.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use souq_integration_tests::{TestContext, id_of, json_body, unique_name};

async fn product_with_stock(ctx: &TestContext, token: &str, stock: i32) -> Value {
    ctx.create(
        token,
        "/products",
        &json!({ "name": unique_name("Mug"), "price": "12.00", "stock": stock }),
    )
    .await
}

async fn add(ctx: &TestContext, cart: &Value, item: &Value) -> Value {
    let response = ctx
        .post("/cart/add")
        .json(&json!({ "cart": cart, "item": item }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn test_cart_add_merges_and_respects_stock() {
    let ctx = TestContext::from_env();
    let token = ctx.admin_token().await;
    let product = product_with_stock(&ctx, &token, 3).await;
    let item = json!({
        "productId": id_of(&product),
        "name": product["name"],
        "price": "12.00",
        "quantity": 2,
    });

    let first = add(&ctx, &json!([]), &item).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["cart"][0]["quantity"], 2);

    let second = add(&ctx, &first["cart"], &item).await;
    assert_eq!(second["success"], false);
    assert_eq!(second["available"], 3);
    assert_eq!(second["cart"], first["cart"]);

    let mut one_more = item.clone();
    one_more["quantity"] = json!(1);
    let third = add(&ctx, &first["cart"], &one_more).await;
    assert_eq!(third["success"], true);
    assert_eq!(third["cart"].as_array().map(Vec::len), Some(1));
    assert_eq!(third["cart"][0]["quantity"], 3);
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn test_cart_add_unknown_product_is_404() {
    let ctx = TestContext::from_env();

    let response = ctx
        .post("/cart/add")
        .json(&json!({
            "cart": [],
            "item": { "productId": 2147483647, "name": "Ghost", "price": "1", "quantity": 1 },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn test_fulfill_decrements_product_and_color() {
    let ctx = TestContext::from_env();
    let token = ctx.admin_token().await;
    let product = product_with_stock(&ctx, &token, 5).await;
    let product_id = id_of(&product);
    let color = ctx
        .create(
            &token,
            "/product-colors",
            &json!({ "productId": product_id, "name": "Blue", "stock": 2 }),
        )
        .await;

    let response = ctx
        .post("/orders/fulfill")
        .bearer_auth(&token)
        .json(&json!({ "lines": [{ "productId": product_id, "colorId": id_of(&color), "quantity": 2 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["lines"][0]["remainingStock"], 3);
    assert_eq!(body["lines"][0]["remainingColorStock"], 0);
}

#[tokio::test]
#[ignore = "requires a running API"]
async fn test_fulfill_shortfall_rolls_back_every_line() {
    let ctx = TestContext::from_env();
    let token = ctx.admin_token().await;
    let plenty = product_with_stock(&ctx, &token, 10).await;
    let scarce = product_with_stock(&ctx, &token, 1).await;

    let response = ctx
        .post("/orders/fulfill")
        .bearer_auth(&token)
        .json(&json!({ "lines": [
            { "productId": id_of(&plenty), "quantity": 4 },
            { "productId": id_of(&scarce), "quantity": 2 },
        ] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let message = json_body(response).await["message"].as_str().unwrap().to_owned();
    assert!(message.contains(scarce["name"].as_str().unwrap()));

    let stock = json_body(
        ctx.get(&format!("/products/{}/stock", id_of(&plenty)))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(stock["stock"], 10);
}
