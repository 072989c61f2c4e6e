//! Seed the catalog and site settings from YAML files.
//!
//! # Catalog file
//!
//! ```yaml
//! companies:
//!   - name: Nile Textiles
//!     logo: /uploads/companies/nile.png
//! categories:
//!   - name: Clothing
//!     subcategories:
//!       - name: Shirts
//! products:
//!   - name: Linen Shirt
//!     price: "249.00"
//!     stock: 12
//!     company: Nile Textiles
//!     category: Clothing
//!     subcategory: Shirts
//!     colors:
//!       - name: White
//!         hexCode: "#ffffff"
//!         stock: 5
//! ```
//!
//! Companies, categories and subcategories are matched by name
//! (case-insensitive) and only created when missing, so the file can be
//! applied repeatedly. A product whose name already exists is skipped along
//! with its colors.
//!
//! # Settings file
//!
//! The same camelCase fields `PUT /settings` accepts. The API caches the
//! public subset for a few minutes, so changes may not show immediately.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use souq_api::db::{
    CategoryRepository, CompanyRepository, ProductColorRepository, ProductRepository,
    RepositoryError, SettingsRepository,
};
use souq_api::models::{
    CategoryInput, CompanyInput, ProductColorInput, ProductFilter, ProductInput, SettingsInput,
    ValidationError,
};
use souq_core::{CategoryId, CompanyId, ProductId, SubcategoryId};

use super::ConnectError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{context}: {source}")]
    Invalid {
        context: String,
        source: ValidationError,
    },

    #[error("Product {product:?} references unknown {kind} {name:?}")]
    UnknownReference {
        product: String,
        kind: &'static str,
        name: String,
    },

    #[error("Product {0:?} names a subcategory without its category")]
    SubcategoryWithoutCategory(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSeed {
    pub companies: Vec<CompanyInput>,
    pub categories: Vec<CategorySeed>,
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    #[serde(flatten)]
    pub category: CategoryInput,
    #[serde(default)]
    pub subcategories: Vec<CategoryInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeed {
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
    pub company: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColorSeed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSeed {
    pub name: String,
    #[serde(default)]
    pub hex_code: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock: i32,
}

impl ProductSeed {
    fn validated_input(&self, refs: ProductRefs) -> Result<ProductInput, SeedError> {
        ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            image: self.image.clone(),
            hover_image: self.hover_image.clone(),
            category_id: refs.category_id,
            subcategory_id: refs.subcategory_id,
            company_id: refs.company_id,
        }
        .validated()
        .map_err(|source| SeedError::Invalid {
            context: format!("product {:?}", self.name),
            source,
        })
    }
}

impl ColorSeed {
    fn validated_input(
        &self,
        product_id: ProductId,
        product: &str,
    ) -> Result<ProductColorInput, SeedError> {
        ProductColorInput {
            product_id,
            name: self.name.clone(),
            hex_code: self.hex_code.clone(),
            image: self.image.clone(),
            stock: self.stock,
        }
        .validated()
        .map_err(|source| SeedError::Invalid {
            context: format!("product {product:?} color {:?}", self.name),
            source,
        })
    }
}

impl CatalogSeed {
    /// Parse a catalog file.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Run every payload through the same validation the API applies, before
    /// anything is written.
    pub fn validated(self) -> Result<Self, SeedError> {
        let companies = self
            .companies
            .into_iter()
            .map(|company| {
                let context = format!("company {:?}", company.name);
                company.validated().map_err(|source| SeedError::Invalid { context, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut categories = Vec::with_capacity(self.categories.len());
        for seed in self.categories {
            let context = format!("category {:?}", seed.category.name);
            let category = seed
                .category
                .validated()
                .map_err(|source| SeedError::Invalid { context, source })?;
            let subcategories = seed
                .subcategories
                .into_iter()
                .map(|sub| {
                    let context = format!("subcategory {:?} of {:?}", sub.name, category.name);
                    sub.validated().map_err(|source| SeedError::Invalid { context, source })
                })
                .collect::<Result<Vec<_>, _>>()?;
            categories.push(CategorySeed {
                category,
                subcategories,
            });
        }

        for product in &self.products {
            if product.subcategory.is_some() && product.category.is_none() {
                return Err(SeedError::SubcategoryWithoutCategory(product.name.clone()));
            }
            product.validated_input(ProductRefs::default())?;
            for color in &product.colors {
                color.validated_input(ProductId::new(0), &product.name)?;
            }
        }

        Ok(Self {
            companies,
            categories,
            products: self.products,
        })
    }
}

// =============================================================================
// Name resolution
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct ProductRefs {
    category_id: Option<CategoryId>,
    subcategory_id: Option<SubcategoryId>,
    company_id: Option<CompanyId>,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Catalog entities by case-insensitive name.
#[derive(Debug, Default)]
struct NameIndex {
    companies: HashMap<String, CompanyId>,
    categories: HashMap<String, CategoryId>,
    subcategories: HashMap<(String, String), SubcategoryId>,
}

impl NameIndex {
    fn add_company(&mut self, name: &str, id: CompanyId) {
        self.companies.insert(name_key(name), id);
    }

    fn add_category(&mut self, name: &str, id: CategoryId) {
        self.categories.insert(name_key(name), id);
    }

    fn add_subcategory(&mut self, category: &str, name: &str, id: SubcategoryId) {
        self.subcategories
            .insert((name_key(category), name_key(name)), id);
    }

    fn company(&self, name: &str) -> Option<CompanyId> {
        self.companies.get(&name_key(name)).copied()
    }

    fn category(&self, name: &str) -> Option<CategoryId> {
        self.categories.get(&name_key(name)).copied()
    }

    fn subcategory(&self, category: &str, name: &str) -> Option<SubcategoryId> {
        self.subcategories
            .get(&(name_key(category), name_key(name)))
            .copied()
    }

    fn resolve(&self, product: &ProductSeed) -> Result<ProductRefs, SeedError> {
        let unknown = |kind: &'static str, name: &str| SeedError::UnknownReference {
            product: product.name.clone(),
            kind,
            name: name.to_owned(),
        };

        let company_id = product
            .company
            .as_deref()
            .map(|name| self.company(name).ok_or_else(|| unknown("company", name)))
            .transpose()?;
        let category_id = product
            .category
            .as_deref()
            .map(|name| self.category(name).ok_or_else(|| unknown("category", name)))
            .transpose()?;
        let subcategory_id = match (product.category.as_deref(), product.subcategory.as_deref()) {
            (Some(category), Some(name)) => Some(
                self.subcategory(category, name)
                    .ok_or_else(|| unknown("subcategory", name))?,
            ),
            (None, Some(_)) => {
                return Err(SeedError::SubcategoryWithoutCategory(product.name.clone()));
            }
            (_, None) => None,
        };

        Ok(ProductRefs {
            category_id,
            subcategory_id,
            company_id,
        })
    }
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Default)]
struct SeedSummary {
    created: usize,
    skipped: usize,
}

async fn read(path: &Path) -> Result<String, SeedError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Load a catalog file into the database.
pub async fn catalog(path: &Path) -> Result<(), SeedError> {
    tracing::info!(path = %path.display(), "Loading catalog seed");
    let seed = CatalogSeed::from_yaml(&read(path).await?)?.validated()?;
    tracing::info!(
        companies = seed.companies.len(),
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Seed file validated"
    );

    let pool = super::connect().await?;
    let mut index = NameIndex::default();
    let mut summary = SeedSummary::default();

    let companies = CompanyRepository::new(&pool);
    for company in companies.list().await? {
        index.add_company(&company.name, company.id);
    }
    for input in &seed.companies {
        if index.company(&input.name).is_some() {
            summary.skipped += 1;
            continue;
        }
        let company = companies.create(input).await?;
        index.add_company(&company.name, company.id);
        summary.created += 1;
    }

    let categories = CategoryRepository::new(&pool);
    for category in categories.list().await? {
        index.add_category(&category.name, category.id);
        for sub in &category.subcategories {
            index.add_subcategory(&category.name, &sub.name, sub.id);
        }
    }
    for seed_category in &seed.categories {
        let name = &seed_category.category.name;
        let category_id = if let Some(id) = index.category(name) {
            summary.skipped += 1;
            id
        } else {
            let category = categories.create(&seed_category.category).await?;
            index.add_category(&category.name, category.id);
            summary.created += 1;
            category.id
        };

        for input in &seed_category.subcategories {
            if index.subcategory(name, &input.name).is_some() {
                summary.skipped += 1;
                continue;
            }
            let sub = categories.create_subcategory(category_id, input).await?;
            index.add_subcategory(name, &sub.name, sub.id);
            summary.created += 1;
        }
    }

    let products = ProductRepository::new(&pool);
    let colors = ProductColorRepository::new(&pool);
    for seed_product in &seed.products {
        let refs = index.resolve(seed_product)?;
        if product_exists(&products, &seed_product.name).await? {
            tracing::info!(product = %seed_product.name, "Product exists, skipping");
            summary.skipped += 1;
            continue;
        }

        let product = products
            .create(&seed_product.validated_input(refs)?)
            .await?;
        summary.created += 1;

        for color in &seed_product.colors {
            let input = color.validated_input(product.id, &product.name)?;
            match colors.create(&input).await {
                Ok(_) => summary.created += 1,
                Err(RepositoryError::Conflict(_)) => summary.skipped += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        "Catalog seeding complete!"
    );
    Ok(())
}

async fn product_exists(products: &ProductRepository<'_>, name: &str) -> Result<bool, SeedError> {
    let filter = ProductFilter {
        q: Some(name.to_owned()),
        limit: Some(ProductFilter::MAX_LIMIT),
        ..ProductFilter::default()
    };
    let key = name_key(name);
    Ok(products
        .list(&filter)
        .await?
        .iter()
        .any(|product| name_key(&product.name) == key))
}

/// Replace the site settings with the contents of a YAML file.
pub async fn settings(path: &Path) -> Result<(), SeedError> {
    tracing::info!(path = %path.display(), "Loading settings seed");
    let input: SettingsInput = serde_yaml::from_str(&read(path).await?)?;
    let input = input.validated().map_err(|source| SeedError::Invalid {
        context: "settings".to_owned(),
        source,
    })?;

    let pool = super::connect().await?;
    let settings = SettingsRepository::new(&pool).upsert(&input).await?;

    tracing::info!(site_name = %settings.site_name, "Settings saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r##"
companies:
  - name: Nile Textiles
categories:
  - name: Clothing
    description: Everyday wear
    subcategories:
      - name: Shirts
      - name: Trousers
products:
  - name: Linen Shirt
    price: "249.00"
    stock: 12
    company: nile textiles
    category: Clothing
    subcategory: shirts
    colors:
      - name: White
        hexCode: "#ffffff"
        stock: 5
  - name: Gift Card
    price: "100"
"##;

    fn seeded_index() -> NameIndex {
        let mut index = NameIndex::default();
        index.add_company("Nile Textiles", CompanyId::new(1));
        index.add_category("Clothing", CategoryId::new(2));
        index.add_subcategory("Clothing", "Shirts", SubcategoryId::new(3));
        index
    }

    #[test]
    fn test_parse_catalog() {
        let seed = CatalogSeed::from_yaml(CATALOG).unwrap().validated().unwrap();
        assert_eq!(seed.companies.len(), 1);
        assert_eq!(seed.categories[0].subcategories.len(), 2);
        assert_eq!(
            seed.categories[0].category.description.as_deref(),
            Some("Everyday wear")
        );
        assert_eq!(seed.products[0].price, Decimal::new(24900, 2));
        assert_eq!(seed.products[0].colors[0].hex_code.as_deref(), Some("#ffffff"));
        assert_eq!(seed.products[1].stock, 0);
    }

    #[test]
    fn test_empty_file_is_empty_seed() {
        let seed = CatalogSeed::from_yaml("{}").unwrap();
        assert!(seed.companies.is_empty() && seed.products.is_empty());
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        assert!(matches!(
            CatalogSeed::from_yaml("brands: []"),
            Err(SeedError::Yaml(_))
        ));
    }

    #[test]
    fn test_negative_price_rejected_before_connecting() {
        let yaml = "products:\n  - name: Broken\n    price: \"-5\"\n";
        let err = CatalogSeed::from_yaml(yaml).unwrap().validated().unwrap_err();
        assert!(err.to_string().contains("price cannot be negative"));
    }

    #[test]
    fn test_blank_company_rejected() {
        let yaml = "companies:\n  - name: \"  \"\n";
        let err = CatalogSeed::from_yaml(yaml).unwrap().validated().unwrap_err();
        assert!(matches!(err, SeedError::Invalid { .. }));
    }

    #[test]
    fn test_subcategory_requires_category() {
        let yaml = "products:\n  - name: Orphan\n    price: \"1\"\n    subcategory: Shirts\n";
        let err = CatalogSeed::from_yaml(yaml).unwrap().validated().unwrap_err();
        assert!(matches!(err, SeedError::SubcategoryWithoutCategory(_)));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let seed = CatalogSeed::from_yaml(CATALOG).unwrap();
        let refs = seeded_index().resolve(&seed.products[0]).unwrap();
        assert_eq!(refs.company_id, Some(CompanyId::new(1)));
        assert_eq!(refs.category_id, Some(CategoryId::new(2)));
        assert_eq!(refs.subcategory_id, Some(SubcategoryId::new(3)));

        let refs = seeded_index().resolve(&seed.products[1]).unwrap();
        assert!(refs.company_id.is_none() && refs.category_id.is_none());
    }

    #[test]
    fn test_resolve_unknown_subcategory() {
        let yaml = "products:\n  - name: Jeans\n    price: \"1\"\n    category: Clothing\n    subcategory: Denim\n";
        let seed = CatalogSeed::from_yaml(yaml).unwrap();
        match seeded_index().resolve(&seed.products[0]) {
            Err(SeedError::UnknownReference { kind, name, .. }) => {
                assert_eq!(kind, "subcategory");
                assert_eq!(name, "Denim");
            }
            other => panic!("expected unknown reference, got {other:?}"),
        }
    }

    #[test]
    fn test_subcategory_scoped_to_its_category() {
        let mut index = seeded_index();
        index.add_category("Shoes", CategoryId::new(9));
        let yaml = "products:\n  - name: Boot\n    price: \"1\"\n    category: Shoes\n    subcategory: Shirts\n";
        let seed = CatalogSeed::from_yaml(yaml).unwrap();
        assert!(index.resolve(&seed.products[0]).is_err());
    }
}
