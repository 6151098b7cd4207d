//! User definition and the authorization evaluator

use super::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A user account with its granted roles.
///
/// `has_role` and `has_permission` are pure functions of the relationship
/// data loaded onto this value; staleness is delegated to the storage
/// layer's read-after-write guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database identifier
    pub id: i32,
    /// Username (unique once set; filled in by the post-registration hook)
    pub username: Option<String>,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2 PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account is active
    pub active: bool,
    /// Stable identity token, assigned once at creation and never changed.
    /// Session tokens embed it and are only honored while it matches.
    pub uniquifier: String,
    /// Email confirmation timestamp
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Previous login timestamp
    pub last_login_at: Option<DateTime<Utc>>,
    /// Current login timestamp
    pub current_login_at: Option<DateTime<Utc>>,
    /// Previous login origin
    pub last_login_ip: Option<String>,
    /// Current login origin
    pub current_login_ip: Option<String>,
    /// Number of logins
    pub login_count: i32,
    /// Roles granted to this user (set semantics, order irrelevant)
    pub roles: Vec<Role>,
}

impl User {
    /// True iff the named role appears in this user's role set.
    ///
    /// Membership is flat; there is no inheritance or hierarchy between
    /// roles.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|r| r.name == role_name)
    }

    /// True iff the named permission appears in the union of permission
    /// sets across all of this user's roles.
    ///
    /// A user with multiple roles receives the union of their grants; there
    /// is no explicit deny and no precedence. A user with zero roles holds
    /// no permissions.
    pub fn has_permission(&self, permission_name: &str) -> bool {
        self.roles.iter().any(|r| r.grants(permission_name))
    }

    /// All distinct permission names granted through this user's roles
    pub fn permission_names(&self) -> HashSet<&str> {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter().map(|p| p.name.as_str()))
            .collect()
    }
}
