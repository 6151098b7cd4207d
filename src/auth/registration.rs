//! Self-registration flow
//!
//! The base user write only knows email/password/active; the username comes
//! from the extended registration form and is persisted by a post-create
//! hook invoked synchronously right after the insert.

use super::password::hash_password;
use super::system::AuthSystem;
use crate::core::models::User;
use crate::utils::error::{CmsError, Result};
use crate::utils::validation::{validate_email, validate_password, validate_username};
use serde::Deserialize;
use tracing::info;

/// Extended registration form: the base authentication schema plus the
/// `username` field
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    /// Desired username (3-80 chars, `[A-Za-z0-9_-]`)
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password (hashed before storage)
    pub password: String,
}

impl AuthSystem {
    /// Register a new user.
    ///
    /// Self-registered users start with no roles. Duplicate usernames and
    /// emails are rejected up front where cheap; the store's uniqueness
    /// constraints settle any race, surfacing as a conflict.
    pub async fn register(&self, form: &RegistrationForm) -> Result<User> {
        info!("User registration attempt: {}", form.username);

        validate_username(&form.username)?;
        validate_email(&form.email)?;
        validate_password(&form.password)?;

        if self
            .storage
            .db()
            .find_user_by_username(&form.username)
            .await?
            .is_some()
        {
            return Err(CmsError::conflict("Username already exists"));
        }
        if self
            .storage
            .db()
            .find_user_by_email(&form.email)
            .await?
            .is_some()
        {
            return Err(CmsError::conflict("Email already exists"));
        }

        let password_hash = hash_password(&form.password)?;
        let user = self
            .storage
            .db()
            .create_user(&form.email, &password_hash, true)
            .await?;

        let user = self.on_user_registered(user, form).await?;

        info!("User registered successfully: {}", form.username);
        Ok(user)
    }

    /// Post-create hook: persists the extra form fields the base write does
    /// not carry. Called synchronously by [`AuthSystem::register`]; it is
    /// the single consumer of registration side effects.
    async fn on_user_registered(&self, user: User, form: &RegistrationForm) -> Result<User> {
        self.storage
            .db()
            .attach_username(user.id, &form.username)
            .await?;
        self.storage.db().reload_user(&user).await
    }
}
