//! Access-control gate
//!
//! Explicit functions handlers call at the top of a request. Two distinct
//! denial shapes exist and call sites pick deliberately:
//!
//! - [`roles_required`] answers a hard HTTP 403 (API-style denial),
//! - [`permission_required`] answers a denial notice with a safe redirect
//!   to the landing page (the soft, user-facing variant).
//!
//! Unauthenticated access is always a redirect to the login entry point
//! preserving the originally requested path in `next`.

use super::state::AppState;
use crate::core::models::User;
use crate::utils::error::{CmsError, Result};
use actix_web::HttpRequest;
use tracing::debug;

/// Resolve the authenticated user for this request or fail with a redirect
/// to `/auth/login?next=<requested path>`.
pub async fn login_required(req: &HttpRequest, state: &AppState) -> Result<User> {
    let next = req.path().to_string();

    let token = match extract_session_token(req) {
        Some(token) => token,
        None => {
            debug!("No session credentials for protected path {}", next);
            return Err(CmsError::LoginRequired { next });
        }
    };

    match state.auth.authenticate(&token).await {
        Ok(user) => Ok(user),
        Err(e) => {
            debug!("Session rejected for {}: {}", next, e);
            Err(CmsError::LoginRequired { next })
        }
    }
}

/// Require a role by name; missing role is a hard HTTP 403.
pub fn roles_required(user: &User, role_name: &str) -> Result<()> {
    if user.has_role(role_name) {
        Ok(())
    } else {
        Err(CmsError::Forbidden(format!(
            "Role '{}' is required",
            role_name
        )))
    }
}

/// Require a permission by name; denial is a user-visible notice with a
/// safe redirect to the landing page.
pub fn permission_required(user: &User, permission_name: &str) -> Result<()> {
    if user.has_permission(permission_name) {
        Ok(())
    } else {
        Err(CmsError::PermissionDenied(format!(
            "You do not have permission to perform this action ({})",
            permission_name
        )))
    }
}

/// Administrative views require all three: an active account, an
/// authenticated session (the caller already resolved the user) and the
/// `admin` role. No partial admin tiers exist.
pub fn admin_accessible(user: &User) -> Result<()> {
    if !user.active {
        return Err(CmsError::Forbidden("Account is not active".to_string()));
    }
    roles_required(user, "admin")
}

/// Pull the session token from the `Authorization: Bearer` header or the
/// `session` cookie.
fn extract_session_token(req: &HttpRequest) -> Option<String> {
    if let Some(header) = req.headers().get(actix_web::http::header::AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    req.cookie("session").map(|c| c.value().to_string())
}
