//! Request extractors whose rejections render as [`AppError`] JSON bodies.
//!
//! Axum's own `Json`, `Query` and `Path` reject with plain text; these wrappers
//! keep every 4xx in the `{ success: false, message }` shape.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};

use crate::error::AppError;

/// `axum::Json` with an [`AppError`] rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with an [`AppError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` with an [`AppError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
