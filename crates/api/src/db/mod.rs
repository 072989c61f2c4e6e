//! Database operations for the Souq `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `company` - Brands that products belong to
//! - `category` / `subcategory` - Two-level catalog tree
//! - `product` - Catalog items with price and stock
//! - `product_color` - Per-product color variants with their own stock
//! - `settings` - Singleton site settings row (`id = 1`)
//! - `user` - Accounts for the admin console and storefront customers
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p souq-cli -- migrate
//! ```

pub mod categories;
pub mod companies;
pub mod inventory;
pub mod product_colors;
pub mod products;
pub mod settings;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use companies::CompanyRepository;
pub use inventory::InventoryRepository;
pub use product_colors::ProductColorRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique key or dangling reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map constraint violations onto [`RepositoryError::Conflict`].
///
/// `what` names the entity for unique violations, e.g. "company name".
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!(
                "{what} references a record that does not exist"
            ));
        }
        if db_err.is_check_violation() {
            return RepositoryError::Conflict(format!("{what} violates a constraint"));
        }
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
