//! Catalog domain types: companies, categories, products and colors.
//!
//! These are the validated shapes the repositories return and the JSON the
//! API serves. Request payloads (`*Input`) carry their own validation so that
//! handlers reject bad data before touching the database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souq_core::{CategoryId, CompanyId, ProductColorId, ProductId, SubcategoryId};

use super::{ValidationError, non_blank, trimmed_opt};

// =============================================================================
// Company
// =============================================================================

/// A brand that products can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for a company.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl CompanyInput {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is blank.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_blank("name", &self.name)?,
            logo: trimmed_opt(self.logo),
        })
    }
}

// =============================================================================
// Category / Subcategory
// =============================================================================

/// A top-level category with its subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subcategory under exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload shared by categories and subcategories.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CategoryInput {
    /// Trim fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is blank.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_blank("name", &self.name)?,
            description: trimmed_opt(self.description),
            image: trimmed_opt(self.image),
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its color variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub hover_image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub company_id: Option<CompanyId>,
    /// Derived on read from `created_at`; never stored.
    pub is_new: bool,
    pub colors: Vec<ProductColor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decimal places stored for a price.
const PRICE_SCALE: u32 = 2;

/// Exclusive upper bound of a `NUMERIC(12, 2)` price.
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Create/replace payload for a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub hover_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl ProductInput {
    /// Trim fields and check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, a negative stock, or
    /// a price that is negative, has more than two decimal places or does not
    /// fit `NUMERIC(12, 2)`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.price.is_sign_negative() {
            return Err(ValidationError::new("price cannot be negative"));
        }
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(ValidationError::new(
                "price cannot have more than 2 decimal places",
            ));
        }
        if self.price >= Decimal::from(PRICE_LIMIT) {
            return Err(ValidationError::new("price must be below 10000000000"));
        }
        if self.stock < 0 {
            return Err(ValidationError::new("stock cannot be negative"));
        }
        Ok(Self {
            name: non_blank("name", &self.name)?,
            description: trimmed_opt(self.description),
            image: trimmed_opt(self.image),
            hover_image: trimmed_opt(self.hover_image),
            ..self
        })
    }
}

/// Query-string filters for listing products.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(alias = "category_id")]
    pub category_id: Option<CategoryId>,
    #[serde(alias = "subcategory_id")]
    pub subcategory_id: Option<SubcategoryId>,
    #[serde(alias = "company_id")]
    pub company_id: Option<CompanyId>,
    /// Case-insensitive substring match on the name.
    pub q: Option<String>,
    /// Only products still inside the "new" window.
    #[serde(default, alias = "new_only")]
    pub new_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Non-negative offset.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// The search term as an `ILIKE` pattern, if any.
    #[must_use]
    pub fn name_pattern(&self) -> Option<String> {
        let q = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())?;
        let escaped = q
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}

// =============================================================================
// Product colors
// =============================================================================

/// A color variant of a product with its own image and stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub id: ProductColorId,
    pub product_id: ProductId,
    pub name: String,
    pub hex_code: Option<String>,
    pub image: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for a product color.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColorInput {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub hex_code: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: i32,
}

impl ProductColorInput {
    /// Trim fields and check ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, a malformed hex code or
    /// a negative stock.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.stock < 0 {
            return Err(ValidationError::new("stock cannot be negative"));
        }
        let hex_code = trimmed_opt(self.hex_code);
        if let Some(hex) = &hex_code
            && !is_hex_color(hex)
        {
            return Err(ValidationError::new("hexCode must look like #RRGGBB"));
        }
        Ok(Self {
            name: non_blank("name", &self.name)?,
            hex_code,
            image: trimmed_opt(self.image),
            ..self
        })
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Current stock of a product and each of its colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: ProductId,
    pub stock: i32,
    pub colors: Vec<ColorStock>,
}

/// Stock of one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStock {
    pub id: ProductColorId,
    pub name: String,
    pub stock: i32,
}

impl StockLevel {
    /// Units available for a cart line: the named color's stock when the
    /// product has that color, the product's own stock otherwise.
    #[must_use]
    pub fn available_for(&self, color_name: Option<&str>) -> u32 {
        let color = color_name
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .and_then(|name| self.colors.iter().find(|c| c.name == name));
        let stock = color.map_or(self.stock, |c| c.stock);
        u32::try_from(stock).unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_input(price: &str, stock: i32) -> ProductInput {
        ProductInput {
            name: "  Linen shirt ".to_string(),
            description: Some("   ".to_string()),
            price: price.parse().unwrap(),
            stock,
            image: Some("/uploads/products/a.png".to_string()),
            hover_image: None,
            category_id: Some(CategoryId::new(1)),
            subcategory_id: None,
            company_id: None,
        }
    }

    #[test]
    fn test_product_input_trims_and_accepts_zero_price() {
        let input = product_input("0", 0).validated().unwrap();
        assert_eq!(input.name, "Linen shirt");
        assert_eq!(input.description, None);
        assert_eq!(input.category_id, Some(CategoryId::new(1)));
    }

    #[test]
    fn test_product_input_rejects_negative_values() {
        assert!(product_input("-0.01", 1).validated().is_err());
        assert!(product_input("10", -1).validated().is_err());
    }

    #[test]
    fn test_product_input_price_must_fit_column() {
        assert!(product_input("9999999999.99", 1).validated().is_ok());
        let err = product_input("10000000000", 1).validated().unwrap_err();
        assert_eq!(err.to_string(), "price must be below 10000000000");
    }

    #[test]
    fn test_product_input_price_has_at_most_two_decimals() {
        assert!(product_input("10.50", 1).validated().is_ok());
        assert!(product_input("10.500", 1).validated().is_ok());
        let err = product_input("10.555", 1).validated().unwrap_err();
        assert_eq!(
            err.to_string(),
            "price cannot have more than 2 decimal places"
        );
    }

    #[test]
    fn test_company_input_requires_name() {
        let input = CompanyInput {
            name: " \t".to_string(),
            logo: None,
        };
        assert_eq!(input.validated().unwrap_err().to_string(), "name is required");
    }

    #[test]
    fn test_color_input_validates_hex() {
        let input = |hex: &str| ProductColorInput {
            product_id: ProductId::new(1),
            name: "Red".to_string(),
            hex_code: Some(hex.to_string()),
            image: None,
            stock: 3,
        };
        assert!(input("#ff0000").validated().is_ok());
        assert!(input("#F00").validated().is_ok());
        assert!(input("ff0000").validated().is_err());
        assert!(input("#gg0000").validated().is_err());
        assert_eq!(input("  ").validated().unwrap().hex_code, None);
    }

    #[test]
    fn test_filter_limits_and_pattern() {
        let filter = ProductFilter {
            q: Some(" 50%_off ".to_string()),
            limit: Some(10_000),
            offset: Some(-4),
            ..ProductFilter::default()
        };
        assert_eq!(filter.limit(), ProductFilter::MAX_LIMIT);
        assert_eq!(filter.offset(), 0);
        assert_eq!(filter.name_pattern().as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(ProductFilter::default().limit(), 50);
        assert_eq!(ProductFilter::default().name_pattern(), None);
    }

    #[test]
    fn test_stock_available_for_color() {
        let level = StockLevel {
            product_id: ProductId::new(1),
            stock: 9,
            colors: vec![ColorStock {
                id: ProductColorId::new(3),
                name: "Red".to_string(),
                stock: 2,
            }],
        };
        assert_eq!(level.available_for(Some("Red")), 2);
        assert_eq!(level.available_for(Some("Green")), 9);
        assert_eq!(level.available_for(None), 9);
        assert_eq!(level.available_for(Some("")), 9);
    }
}
