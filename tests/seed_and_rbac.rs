//! Seeding and RBAC integration tests
//!
//! Exercises the storage layer and catalog provisioning against a real
//! in-memory SQLite database.

use cms_rs::auth::provision::{
    self, BOOTSTRAP_ADMIN_EMAIL, PERMISSION_CATALOG, ROLE_CATALOG,
};
use cms_rs::config::DatabaseConfig;
use cms_rs::storage::database::Database;
use cms_rs::CmsError;

/// In-memory SQLite. The pool is capped at one connection: each connection
/// gets its own private in-memory database, so a larger pool would scatter
/// the schema.
async fn setup_db() -> Database {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    };

    let db = Database::new(&config).await.expect("Failed to create database");
    db.migrate().await.expect("Migration failed");
    db
}

#[tokio::test]
async fn test_seed_catalog_is_idempotent() {
    let db = setup_db().await;

    provision::seed_catalog(&db).await.expect("First seeding failed");
    provision::seed_catalog(&db).await.expect("Second seeding failed");

    let permissions = db.list_permissions().await.unwrap();
    assert_eq!(permissions.len(), PERMISSION_CATALOG.len());

    let roles = db.list_roles().await.unwrap();
    assert_eq!(roles.len(), ROLE_CATALOG.len());

    // Exactly one row per catalog name
    for (name, _) in PERMISSION_CATALOG {
        let matching = permissions.iter().filter(|p| p.name == *name).count();
        assert_eq!(matching, 1, "Permission {} duplicated or missing", name);
    }
}

#[tokio::test]
async fn test_seed_catalog_repairs_drifted_role_permissions() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    // Drift: strip the viewer role down to nothing
    let viewer = db.find_role_by_name("viewer").await.unwrap().unwrap();
    db.set_role_permissions(viewer.id, &[]).await.unwrap();
    let viewer = db.find_role_by_name("viewer").await.unwrap().unwrap();
    assert!(viewer.permissions.is_empty());

    // Re-seeding reasserts the declared set
    provision::seed_catalog(&db).await.unwrap();
    let viewer = db.find_role_by_name("viewer").await.unwrap().unwrap();
    assert_eq!(viewer.permissions.len(), 1);
    assert!(viewer.grants("view_content"));
}

#[tokio::test]
async fn test_bootstrap_admin_created_once() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let created = provision::create_bootstrap_admin(&db).await.unwrap();
    assert!(created);

    let created_again = provision::create_bootstrap_admin(&db).await.unwrap();
    assert!(!created_again);

    let admin = db
        .find_user_by_email(BOOTSTRAP_ADMIN_EMAIL)
        .await
        .unwrap()
        .expect("Bootstrap admin missing");
    assert_eq!(admin.username.as_deref(), Some("admin"));
    assert!(admin.active);
    assert!(admin.has_role("admin"));
    assert!(admin.has_permission("manage_users"));
    assert!(admin.has_permission("delete_content"));
}

#[tokio::test]
async fn test_email_and_username_uniqueness() {
    let db = setup_db().await;

    let user = db.create_user("dup@example.com", "hash", true).await.unwrap();
    db.attach_username(user.id, "taken").await.unwrap();

    let dup_email = db.create_user("dup@example.com", "hash", true).await;
    assert!(matches!(dup_email, Err(CmsError::Conflict(_))));

    let other = db.create_user("other@example.com", "hash", true).await.unwrap();
    let dup_username = db.attach_username(other.id, "taken").await;
    assert!(matches!(dup_username, Err(CmsError::Conflict(_))));
}

#[tokio::test]
async fn test_uniquifier_assigned_once_and_distinct() {
    let db = setup_db().await;

    let a = db.create_user("a@example.com", "hash", true).await.unwrap();
    let b = db.create_user("b@example.com", "hash", true).await.unwrap();
    assert!(!a.uniquifier.is_empty());
    assert_ne!(a.uniquifier, b.uniquifier);

    // Unrelated updates leave the uniquifier untouched
    db.set_user_active(a.id, false).await.unwrap();
    db.update_user_password(a.id, "newhash").await.unwrap();
    let reloaded = db.find_user_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(reloaded.uniquifier, a.uniquifier);
}

#[tokio::test]
async fn test_editor_and_viewer_permission_union() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let editor = db.create_user("editor@example.com", "hash", true).await.unwrap();
    db.assign_role_to_user(editor.id, "editor").await.unwrap();
    let editor = db.find_user_by_id(editor.id).await.unwrap().unwrap();

    let viewer = db.create_user("viewer@example.com", "hash", true).await.unwrap();
    db.assign_role_to_user(viewer.id, "viewer").await.unwrap();
    let viewer = db.find_user_by_id(viewer.id).await.unwrap().unwrap();

    assert!(editor.has_permission("edit_content"));
    assert!(editor.has_permission("approve_content"));
    assert!(!editor.has_permission("manage_users"));

    assert!(viewer.has_permission("view_content"));
    assert!(!viewer.has_permission("edit_content"));

    // Stacking roles unions their grants
    db.assign_role_to_user(viewer.id, "author").await.unwrap();
    let promoted = db.find_user_by_id(viewer.id).await.unwrap().unwrap();
    assert!(promoted.has_permission("create_content"));
    assert!(promoted.has_role("viewer"));
    assert!(promoted.has_role("author"));
}

#[tokio::test]
async fn test_user_with_no_roles_has_no_permissions() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let user = db.create_user("nobody@example.com", "hash", true).await.unwrap();
    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();

    assert!(user.roles.is_empty());
    for (name, _) in PERMISSION_CATALOG {
        assert!(!user.has_permission(name));
    }
}

#[tokio::test]
async fn test_role_assignment_is_idempotent() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let user = db.create_user("dupe@example.com", "hash", true).await.unwrap();
    db.assign_role_to_user(user.id, "viewer").await.unwrap();
    db.assign_role_to_user(user.id, "viewer").await.unwrap();

    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.roles.len(), 1);
}

#[tokio::test]
async fn test_role_deletion_forbidden_while_assigned() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let user = db.create_user("holder@example.com", "hash", true).await.unwrap();
    db.assign_role_to_user(user.id, "viewer").await.unwrap();

    let viewer = db.find_role_by_name("viewer").await.unwrap().unwrap();
    let blocked = db.delete_role(viewer.id).await;
    assert!(matches!(blocked, Err(CmsError::Conflict(_))));

    // Unassign, then deletion succeeds and clears the grant rows
    db.remove_role_from_user(user.id, "viewer").await.unwrap();
    db.delete_role(viewer.id).await.unwrap();
    assert!(db.find_role_by_name("viewer").await.unwrap().is_none());
}

#[tokio::test]
async fn test_permission_deletion_forbidden_while_granted() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let perm = db
        .find_permission_by_name("view_content")
        .await
        .unwrap()
        .unwrap();
    let blocked = db.delete_permission(perm.id).await;
    assert!(matches!(blocked, Err(CmsError::Conflict(_))));

    let orphan = db.create_permission("orphan_permission", None).await.unwrap();
    db.delete_permission(orphan.id).await.unwrap();
    assert!(db
        .find_permission_by_name("orphan_permission")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_set_user_roles_replaces_assignments() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let user = db.create_user("shift@example.com", "hash", true).await.unwrap();
    db.set_user_roles(user.id, &["editor".to_string(), "viewer".to_string()])
        .await
        .unwrap();
    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.roles.len(), 2);

    db.set_user_roles(user.id, &["author".to_string()]).await.unwrap();
    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.roles.len(), 1);
    assert!(user.has_role("author"));
}

#[tokio::test]
async fn test_set_user_roles_with_unknown_role_keeps_existing() {
    let db = setup_db().await;
    provision::seed_catalog(&db).await.unwrap();

    let user = db.create_user("keeper@example.com", "hash", true).await.unwrap();
    db.assign_role_to_user(user.id, "editor").await.unwrap();

    // A replacement naming an unknown role must fail without touching the
    // user's current memberships
    let result = db
        .set_user_roles(user.id, &["no_such_role".to_string()])
        .await;
    assert!(matches!(result, Err(CmsError::NotFound(_))));

    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.roles.len(), 1);
    assert!(user.has_role("editor"));

    // Same when the unknown name is mixed in with valid ones
    let result = db
        .set_user_roles(
            user.id,
            &["viewer".to_string(), "no_such_role".to_string()],
        )
        .await;
    assert!(result.is_err());
    let user = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(user.has_role("editor"));
}

#[tokio::test]
async fn test_seeded_data_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("cms-test.db").display()
    );
    let config = DatabaseConfig {
        url,
        max_connections: 2,
        connection_timeout: 5,
    };

    {
        let db = Database::new(&config).await.unwrap();
        db.migrate().await.unwrap();
        provision::seed_catalog(&db).await.unwrap();
        provision::create_bootstrap_admin(&db).await.unwrap();
    }

    let db = Database::new(&config).await.unwrap();
    let admin = db
        .find_user_by_email(BOOTSTRAP_ADMIN_EMAIL)
        .await
        .unwrap()
        .expect("Seeded admin should persist");
    assert!(admin.has_role("admin"));
    assert_eq!(db.list_roles().await.unwrap().len(), ROLE_CATALOG.len());
}

#[tokio::test]
async fn test_record_login_shifts_history() {
    let db = setup_db().await;

    let user = db.create_user("login@example.com", "hash", true).await.unwrap();
    assert_eq!(user.login_count, 0);

    db.record_login(user.id, Some("10.0.0.1")).await.unwrap();
    let first = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(first.login_count, 1);
    assert_eq!(first.current_login_ip.as_deref(), Some("10.0.0.1"));
    assert!(first.current_login_at.is_some());
    assert!(first.last_login_at.is_none());

    db.record_login(user.id, Some("10.0.0.2")).await.unwrap();
    let second = db.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(second.login_count, 2);
    assert_eq!(second.current_login_ip.as_deref(), Some("10.0.0.2"));
    assert_eq!(second.last_login_ip.as_deref(), Some("10.0.0.1"));
}
