//! Bootstrap provisioning: the permission/role catalog and the initial
//! administrator account
//!
//! Seeding is idempotent by name: re-running creates no duplicates, but it
//! does overwrite each catalog role's permission set to match the declared
//! catalog, so drifted assignments are repaired.

use super::password::hash_password;
use crate::storage::Database;
use crate::utils::error::Result;
use tracing::info;

/// Fixed permission catalog: `(name, description)`
pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    ("view_content", "View content"),
    ("create_content", "Create content"),
    ("edit_content", "Edit content"),
    ("delete_content", "Delete content"),
    ("approve_content", "Approve content"),
    ("manage_users", "Manage users"),
    ("manage_roles", "Manage roles"),
];

/// Fixed role catalog: `(name, description, granted permissions)`
pub const ROLE_CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "admin",
        "Administrator",
        &[
            "view_content",
            "create_content",
            "edit_content",
            "delete_content",
            "approve_content",
            "manage_users",
            "manage_roles",
        ],
    ),
    (
        "editor",
        "Editor",
        &[
            "view_content",
            "create_content",
            "edit_content",
            "delete_content",
            "approve_content",
        ],
    ),
    (
        "author",
        "Author",
        &["view_content", "create_content", "edit_content"],
    ),
    ("viewer", "Viewer", &["view_content"]),
];

/// Bootstrap administrator credentials. A development convenience, not a
/// production credential policy.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@cms-rs.local";
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";

/// Seed the permission and role catalog, idempotently by name.
pub async fn seed_catalog(db: &Database) -> Result<()> {
    info!("Seeding permission and role catalog");

    for (name, description) in PERMISSION_CATALOG {
        if db.find_permission_by_name(name).await?.is_none() {
            db.create_permission(name, Some(description)).await?;
        }
    }

    for (name, description, permissions) in ROLE_CATALOG {
        let role = match db.find_role_by_name(name).await? {
            Some(role) => role,
            None => db.create_role(name, Some(description)).await?,
        };
        // Always reassert the declared permission set
        db.set_role_permissions(role.id, permissions).await?;
    }

    info!("Catalog seeding completed");
    Ok(())
}

/// Create the bootstrap administrator if no user with the well-known email
/// exists yet. Returns whether an account was created.
pub async fn create_bootstrap_admin(db: &Database) -> Result<bool> {
    if db.find_user_by_email(BOOTSTRAP_ADMIN_EMAIL).await?.is_some() {
        info!("Bootstrap administrator already exists, skipping");
        return Ok(false);
    }

    let password_hash = hash_password(BOOTSTRAP_ADMIN_PASSWORD)?;
    let user = db
        .create_user(BOOTSTRAP_ADMIN_EMAIL, &password_hash, true)
        .await?;
    db.attach_username(user.id, BOOTSTRAP_ADMIN_USERNAME).await?;
    db.assign_role_to_user(user.id, "admin").await?;

    info!(
        "Bootstrap administrator created: {} (development credentials)",
        BOOTSTRAP_ADMIN_EMAIL
    );
    Ok(true)
}
