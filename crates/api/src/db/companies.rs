//! Company repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use souq_core::CompanyId;

use super::{RepositoryError, map_write_error};
use crate::models::{Company, CompanyInput};

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: i32,
    name: String,
    logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: CompanyId::new(row.id),
            name: row.name,
            logo: row.logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COMPANY_COLUMNS: &str = "id, name, logo, created_at, updated_at";

/// Repository for company database operations.
pub struct CompanyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all companies alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Company>, RepositoryError> {
        let rows = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM shop.company ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    /// Get a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM shop.company WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Company::from))
    }

    /// Create a company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &CompanyInput) -> Result<Company, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "INSERT INTO shop.company (name, logo) VALUES ($1, $2) RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.logo.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "company"))?;

        Ok(row.into())
    }

    /// Replace a company's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no company has this ID.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: CompanyId,
        input: &CompanyInput,
    ) -> Result<Company, RepositoryError> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            r"
            UPDATE shop.company
            SET name = $2, logo = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMPANY_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.logo.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "company"))?;

        row.map(Company::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a company. Products keep existing with no company.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no company has this ID.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CompanyId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.company WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
