//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! SOUQ_ADMIN_PASSWORD=... souq-cli admin create -e admin@example.com -n "Admin Name"
//! ```
//!
//! Running it again for an existing email promotes that account to admin and
//! sets the new password.

use thiserror::Error;

use souq_api::db::{RepositoryError, UserRepository};
use souq_api::services::auth::{AuthError, hash_password, validate_password};
use souq_core::{Email, EmailError, Role, UserId};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Name is required")]
    MissingName,

    #[error(transparent)]
    Password(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create an admin user, or promote and reset an existing one.
///
/// # Returns
///
/// The ID of the admin user.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::MissingName);
    }
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = super::connect().await?;
    let users = UserRepository::new(&pool);

    let user = match users.create(&email, name, &password_hash, Role::Admin).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");
            user
        }
        Err(RepositoryError::Conflict(_)) => {
            let user = users
                .update_credentials(&email, &password_hash, Role::Admin)
                .await?;
            tracing::info!(user_id = %user.id, email = %user.email, "Existing user promoted to admin");
            user
        }
        Err(e) => return Err(e.into()),
    };

    Ok(user.id)
}
