//! Permission definition

use serde::{Deserialize, Serialize};

/// A named capability that can be granted to roles.
///
/// Identity is the unique `name`; business logic never references a
/// permission any other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Database identifier
    pub id: i32,
    /// Permission name (unique)
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
}
