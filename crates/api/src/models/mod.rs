//! Domain models for the API.

pub mod catalog;
pub mod order;
pub mod settings;
pub mod user;

pub use catalog::{
    Category, CategoryInput, ColorStock, Company, CompanyInput, Product, ProductColor,
    ProductColorInput, ProductFilter, ProductInput, StockLevel, Subcategory,
};
pub use order::{FulfilledLine, FulfillmentLine, FulfillmentRequest};
pub use settings::{Settings, SettingsInput, SiteInfo};
pub use user::User;

/// A request payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trim a required text field, rejecting blank values.
pub(crate) fn non_blank(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
