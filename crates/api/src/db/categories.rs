//! Category and subcategory repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use souq_core::{CategoryId, SubcategoryId};

use super::{RepositoryError, map_write_error};
use crate::models::{Category, CategoryInput, Subcategory};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self, subcategories: Vec<Subcategory>) -> Category {
        Category {
            id: CategoryId::new(self.id),
            name: self.name,
            description: self.description,
            image: self.image,
            subcategories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubcategoryRow {
    id: i32,
    category_id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubcategoryRow> for Subcategory {
    fn from(row: SubcategoryRow) -> Self {
        Self {
            id: SubcategoryId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, image, created_at, updated_at";
const SUBCATEGORY_COLUMNS: &str =
    "id, category_id, name, description, image, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for the two-level category tree.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every category with its subcategories nested.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        let subcategories = sqlx::query_as::<_, SubcategoryRow>(&format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM shop.subcategory ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        let mut by_category: HashMap<i32, Vec<Subcategory>> = HashMap::new();
        for row in subcategories {
            by_category
                .entry(row.category_id)
                .or_default()
                .push(row.into());
        }

        Ok(categories
            .into_iter()
            .map(|row| {
                let subs = by_category.remove(&row.id).unwrap_or_default();
                row.into_category(subs)
            })
            .collect())
    }

    /// Get a category with its subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let subs = self.list_subcategories(id).await?;
        Ok(Some(row.into_category(subs)))
    }

    /// Create a category (with no subcategories).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            INSERT INTO shop.category (name, description, image)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;

        Ok(row.into_category(Vec::new()))
    }

    /// Replace a category's own fields; subcategories are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this ID.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            UPDATE shop.category
            SET name = $2, description = $3, image = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?
        .ok_or(RepositoryError::NotFound)?;

        let subs = self.list_subcategories(id).await?;
        Ok(row.into_category(subs))
    }

    /// Delete a category and, by cascade, its subcategories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this ID.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Subcategories
    // =========================================================================

    /// List the subcategories of one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubcategoryRow>(&format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM shop.subcategory WHERE category_id = $1 ORDER BY name, id"
        ))
        .bind(category_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Subcategory::from).collect())
    }

    /// Get a subcategory by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_subcategory(
        &self,
        id: SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(&format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM shop.subcategory WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Subcategory::from))
    }

    /// Create a subcategory under `category_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the parent category does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_subcategory(
        &self,
        category_id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Subcategory, RepositoryError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(&format!(
            r"
            INSERT INTO shop.subcategory (category_id, name, description, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUBCATEGORY_COLUMNS}
            "
        ))
        .bind(category_id.as_i32())
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            // The only foreign key here is the parent category.
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            map_write_error(e, "subcategory")
        })?;

        Ok(row.into())
    }

    /// Replace a subcategory's fields (it stays under the same category).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no subcategory has this ID.
    #[instrument(skip(self, input))]
    pub async fn update_subcategory(
        &self,
        id: SubcategoryId,
        input: &CategoryInput,
    ) -> Result<Subcategory, RepositoryError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(&format!(
            r"
            UPDATE shop.subcategory
            SET name = $2, description = $3, image = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {SUBCATEGORY_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.image.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "subcategory"))?;

        row.map(Subcategory::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a subcategory. Products keep existing without it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no subcategory has this ID.
    #[instrument(skip(self))]
    pub async fn delete_subcategory(&self, id: SubcategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.subcategory WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
