//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use souq_core::{Email, Role, UserId};

/// A user account (domain type).
///
/// The password hash never leaves the repository layer, so this type is safe
/// to serialize into responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
