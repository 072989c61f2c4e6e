//! The singleton site settings record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, non_blank, trimmed_opt};

/// Site name used until an admin saves settings.
pub const DEFAULT_SITE_NAME: &str = "Souq";

/// Full settings record, as edited in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub site_name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub whatsapp: Option<String>,
    /// `None` until the record has been saved once.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            logo: None,
            description: None,
            email: None,
            phone: None,
            address: None,
            facebook: None,
            instagram: None,
            twitter: None,
            whatsapp: None,
            updated_at: None,
        }
    }
}

/// Replacement payload for the settings record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsInput {
    pub site_name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub whatsapp: Option<String>,
}

impl SettingsInput {
    /// Trim every field; the site name is required.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the site name is blank.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            site_name: non_blank("siteName", &self.site_name)?,
            logo: trimmed_opt(self.logo),
            description: trimmed_opt(self.description),
            email: trimmed_opt(self.email),
            phone: trimmed_opt(self.phone),
            address: trimmed_opt(self.address),
            facebook: trimmed_opt(self.facebook),
            instagram: trimmed_opt(self.instagram),
            twitter: trimmed_opt(self.twitter),
            whatsapp: trimmed_opt(self.whatsapp),
        })
    }
}

/// Public subset of the settings served to the storefront header/footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub site_name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub contact: Contact,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub whatsapp: Option<String>,
}

impl From<Settings> for SiteInfo {
    fn from(s: Settings) -> Self {
        Self {
            site_name: s.site_name,
            logo: s.logo,
            description: s.description,
            contact: Contact {
                email: s.email,
                phone: s.phone,
                address: s.address,
            },
            social: SocialLinks {
                facebook: s.facebook,
                instagram: s.instagram,
                twitter: s.twitter,
                whatsapp: s.whatsapp,
            },
        }
    }
}
