//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database ping)
//!
//! # Auth (rate limited)
//! POST /auth/login                     - Exchange credentials for a token
//! POST /auth/register                  - Create a customer account
//! GET  /auth/me                        - Current user (bearer)
//!
//! # Catalog (writes require admin)
//! GET|POST        /companies
//! GET|PUT|DELETE  /companies/{id}
//! GET|POST        /categories
//! GET|PUT|DELETE  /categories/{id}
//! GET|POST        /categories/{id}/subcategories
//! GET|PUT|DELETE  /subcategories/{id}
//! GET|POST        /products
//! GET|PUT|DELETE  /products/{id}
//! GET             /products/{id}/stock
//! GET|POST        /product-colors
//! GET|PUT|DELETE  /product-colors/{id}
//!
//! # Settings
//! GET|PUT /settings                    - Full record (admin)
//! GET     /site-info                   - Public subset (cached)
//!
//! # Cart and orders
//! POST /cart/add                       - Stock-checked add to a client cart
//! POST /orders/fulfill                 - Decrement stock (admin)
//!
//! # Uploads
//! POST /upload/{kind}                  - Multipart image upload (admin)
//! GET  /uploads/{kind}/{file}          - Static files
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod companies;
pub mod health;
pub mod orders;
pub mod product_colors;
pub mod products;
pub mod settings;
pub mod uploads;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::services::uploads::PUBLIC_PREFIX;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Body of a successful delete.
pub(crate) fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter())
        .route("/me", get(auth::me))
}

/// Create the company routes router.
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(companies::index).post(companies::create))
        .route(
            "/{id}",
            get(companies::show)
                .put(companies::update)
                .delete(companies::destroy),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route(
            "/{id}/subcategories",
            get(categories::subcategories).post(categories::create_subcategory),
        )
}

/// Create the subcategory routes router.
pub fn subcategory_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(categories::show_subcategory)
            .put(categories::update_subcategory)
            .delete(categories::destroy_subcategory),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/stock", get(products::stock))
}

/// Create the product color routes router.
pub fn product_color_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(product_colors::index).post(product_colors::create))
        .route(
            "/{id}",
            get(product_colors::show)
                .put(product_colors::update)
                .delete(product_colors::destroy),
        )
}

/// Create all API routes, without middleware or state.
pub fn routes(config: &ApiConfig) -> Router<AppState> {
    let upload_limit = config.uploads.max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/companies", company_routes())
        .nest("/categories", category_routes())
        .nest("/subcategories", subcategory_routes())
        .nest("/products", product_routes())
        .nest("/product-colors", product_color_routes())
        .route(
            "/settings",
            get(settings::show).put(settings::update),
        )
        .route("/site-info", get(settings::site_info))
        .route("/cart/add", post(cart::add))
        .route("/orders/fulfill", post(orders::fulfill))
        .route(
            "/upload/{kind}",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest_service(
            PUBLIC_PREFIX,
            ServeDir::new(&config.uploads.dir).not_found_service(route_not_found.into_service()),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Build the complete application: routes, middleware and state.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    routes(state.config())
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for the storefront and admin console.
///
/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

#[cfg(test)]
mod tests;
