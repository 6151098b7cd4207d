//! Role definition

use super::Permission;
use serde::{Deserialize, Serialize};

/// A role groups permissions and is granted to users.
///
/// Roles do not own permissions exclusively; the same permission may be
/// granted by any number of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Database identifier
    pub id: i32,
    /// Role name (unique)
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Permissions granted by this role (set semantics, order irrelevant)
    pub permissions: Vec<Permission>,
}

impl Role {
    /// True iff this role grants the named permission
    pub fn grants(&self, permission_name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == permission_name)
    }
}
