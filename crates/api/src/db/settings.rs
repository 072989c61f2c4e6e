//! Site settings storage.
//!
//! Settings live in a single row with `id = 1`. Reads before the first save
//! return [`Settings::default`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;
use crate::models::{Settings, SettingsInput};

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    site_name: String,
    logo: Option<String>,
    description: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    facebook: Option<String>,
    instagram: Option<String>,
    twitter: Option<String>,
    whatsapp: Option<String>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Self {
            site_name: row.site_name,
            logo: row.logo,
            description: row.description,
            email: row.email,
            phone: row.phone,
            address: row.address,
            facebook: row.facebook,
            instagram: row.instagram,
            twitter: row.twitter,
            whatsapp: row.whatsapp,
            updated_at: Some(row.updated_at),
        }
    }
}

const SETTINGS_COLUMNS: &str = "site_name, logo, description, email, phone, address, \
     facebook, instagram, twitter, whatsapp, updated_at";

/// Repository for the settings singleton.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current settings, or defaults if none have been saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<Settings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM shop.settings WHERE id = 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Settings::from).unwrap_or_default())
    }

    /// Insert or replace the settings row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    #[instrument(skip(self, input), fields(site_name = %input.site_name))]
    pub async fn upsert(&self, input: &SettingsInput) -> Result<Settings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            r"
            INSERT INTO shop.settings
                (id, site_name, logo, description, email, phone, address,
                 facebook, instagram, twitter, whatsapp)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                site_name = EXCLUDED.site_name,
                logo = EXCLUDED.logo,
                description = EXCLUDED.description,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                facebook = EXCLUDED.facebook,
                instagram = EXCLUDED.instagram,
                twitter = EXCLUDED.twitter,
                whatsapp = EXCLUDED.whatsapp,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "
        ))
        .bind(&input.site_name)
        .bind(input.logo.as_deref())
        .bind(input.description.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.facebook.as_deref())
        .bind(input.instagram.as_deref())
        .bind(input.twitter.as_deref())
        .bind(input.whatsapp.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
