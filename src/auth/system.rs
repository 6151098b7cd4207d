//! Authentication system

use super::password::{hash_password, verify_password};
use super::session::SessionHandler;
use crate::config::SecurityConfig;
use crate::core::models::User;
use crate::storage::StorageLayer;
use crate::utils::error::{CmsError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Authentication system: login, logout, session resolution and password
/// changes. Constructed once at startup with its collaborators injected.
#[derive(Debug, Clone)]
pub struct AuthSystem {
    pub(crate) storage: Arc<StorageLayer>,
    sessions: SessionHandler,
}

impl AuthSystem {
    /// Create a new authentication system
    pub fn new(config: &SecurityConfig, storage: Arc<StorageLayer>) -> Self {
        info!("Initializing authentication system");
        Self {
            sessions: SessionHandler::new(config),
            storage,
        }
    }

    /// Borrow the session handler
    pub fn sessions(&self) -> &SessionHandler {
        &self.sessions
    }

    /// Log a user in by email and password, recording login metadata and
    /// returning the user together with a fresh session token
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip: Option<&str>,
    ) -> Result<(User, String)> {
        info!("User login attempt: {}", email);

        let user = self
            .storage
            .db()
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| CmsError::auth("Invalid email or password"))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(CmsError::auth("Invalid email or password"));
        }

        if !user.active {
            return Err(CmsError::auth("Account is not active"));
        }

        self.storage.db().record_login(user.id, ip).await?;
        let user = self.storage.db().reload_user(&user).await?;
        let token = self.sessions.create_token(&user)?;

        info!("User logged in successfully: {}", email);
        Ok((user, token))
    }

    /// Log a user out. Sessions are stateless tokens; the client discards
    /// its copy and the server only logs the event.
    pub async fn logout(&self, token: &str) -> Result<()> {
        if let Ok(claims) = self.sessions.verify_token(token) {
            info!("User logged out: {}", claims.sub);
        }
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// The token must verify, the user must still exist and be active, and
    /// the embedded uniquifier must match the stored one.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.sessions.verify_token(token)?;

        let user = self
            .storage
            .db()
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| CmsError::auth("Unknown session subject"))?;

        if user.uniquifier != claims.uniquifier {
            debug!("Stale session for user {}", user.id);
            return Err(CmsError::auth("Session is no longer valid"));
        }

        if !user.active {
            return Err(CmsError::auth("Account is not active"));
        }

        Ok(user)
    }

    /// Change a user's password after verifying the current one
    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        info!("Changing password for user: {}", user_id);

        let user = self
            .storage
            .db()
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(CmsError::auth("Invalid current password"));
        }

        crate::utils::validation::validate_password(new_password)?;
        let new_hash = hash_password(new_password)?;
        self.storage.db().update_user_password(user_id, &new_hash).await?;

        info!("Password changed successfully for user: {}", user_id);
        Ok(())
    }
}
