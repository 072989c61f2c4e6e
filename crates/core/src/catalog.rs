//! Catalog rules shared by every reader of product data.

use chrono::{DateTime, Duration, Utc};

/// Number of days a product keeps its "new" badge after creation.
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 7;

/// The "new" badge window as a duration.
#[must_use]
pub fn new_product_window() -> Duration {
    Duration::days(NEW_PRODUCT_WINDOW_DAYS)
}

/// Whether a product created at `created_at` still counts as new at `now`.
///
/// The window is half-open: a product is new from the instant it is created
/// until exactly seven days later. Timestamps in the future (clock skew
/// between the database and the API host) are not new.
#[must_use]
pub fn is_new(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(created_at);
    age >= Duration::zero() && age < new_product_window()
}
