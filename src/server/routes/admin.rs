//! Administrative CRUD endpoints for users, roles and permissions
//!
//! Every handler is gated by `admin_gate`: an active, authenticated user
//! holding the `admin` role. Unauthenticated callers are redirected to the
//! login entry point with the requested path in `next`; authenticated
//! non-admins receive a hard 403.

use super::auth::UserInfo;
use crate::auth::password::hash_password;
use crate::core::models::{Permission, Role, User};
use crate::server::gate;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::{CmsError, Result};
use crate::utils::validation::{validate_email, validate_password, validate_username};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;

/// Configure administrative routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::get().to(list_users))
            .route("/users", web::post().to(create_user))
            .route("/users/{id}", web::put().to(update_user))
            .route("/users/{id}", web::delete().to(delete_user))
            .route("/roles", web::get().to(list_roles))
            .route("/roles", web::post().to(create_role))
            .route("/roles/{id}", web::put().to(update_role))
            .route("/roles/{id}", web::delete().to(delete_role))
            .route("/permissions", web::get().to(list_permissions))
            .route("/permissions", web::post().to(create_permission))
            .route("/permissions/{id}", web::delete().to(delete_permission)),
    );
}

/// Resolve and authorize the requesting administrator
async fn admin_gate(req: &HttpRequest, state: &AppState) -> Result<User> {
    let user = gate::login_required(req, state).await?;
    gate::admin_accessible(&user)?;
    Ok(user)
}

/// Admin-provisioned user creation payload; roles are assigned explicitly
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
    /// Whether the account starts active
    #[serde(default = "default_active")]
    pub active: bool,
    /// Role names to grant
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// User update payload; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New active flag
    pub active: Option<bool>,
    /// Replacement role set
    pub roles: Option<Vec<String>>,
}

/// Role creation payload
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    /// Role name
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Permission names to grant
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Role update payload; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// New description
    pub description: Option<String>,
    /// Replacement permission set
    pub permissions: Option<Vec<String>>,
}

/// Permission creation payload
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    /// Permission name
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
}

async fn list_users(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let users = state.storage.db().list_users().await?;
    let infos: Vec<UserInfo> = users.iter().map(UserInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(infos)))
}

/// Create a user with explicit role assignment. Follows the same two-step
/// write as self-registration: base record first, then the username; the
/// uniquifier is generated on creation as everywhere else.
async fn create_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let admin = admin_gate(&req, &state).await?;

    validate_username(&body.username)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let db = state.storage.db();
    let password_hash = hash_password(&body.password)?;
    let user = db.create_user(&body.email, &password_hash, body.active).await?;
    db.attach_username(user.id, &body.username).await?;
    db.set_user_roles(user.id, &body.roles).await?;
    let user = db.reload_user(&user).await?;

    info!(
        "Admin {} provisioned user {} with roles {:?}",
        admin.email, body.email, body.roles
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(UserInfo::from(&user))))
}

async fn update_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let user_id = path.into_inner();
    let db = state.storage.db();

    if let Some(active) = body.active {
        db.set_user_active(user_id, active).await?;
    }
    if let Some(roles) = &body.roles {
        db.set_user_roles(user_id, roles).await?;
    }

    let user = db
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| CmsError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(&user))))
}

async fn delete_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let admin = admin_gate(&req, &state).await?;

    let user_id = path.into_inner();
    state.storage.db().delete_user(user_id).await?;

    info!("Admin {} deleted user {}", admin.email, user_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("User deleted")))
}

async fn list_roles(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let roles: Vec<Role> = state.storage.db().list_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

async fn create_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateRoleRequest>,
) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let db = state.storage.db();
    let role = db.create_role(&body.name, body.description.as_deref()).await?;

    if !body.permissions.is_empty() {
        let names: Vec<&str> = body.permissions.iter().map(|s| s.as_str()).collect();
        db.set_role_permissions(role.id, &names).await?;
    }

    let role = db
        .find_role_by_name(&body.name)
        .await?
        .ok_or_else(|| CmsError::not_found("Role not found"))?;
    Ok(HttpResponse::Created().json(ApiResponse::success(role)))
}

async fn update_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let role_id = path.into_inner();
    let db = state.storage.db();

    if let Some(description) = &body.description {
        db.update_role_description(role_id, Some(description.as_str()))
            .await?;
    }
    if let Some(permissions) = &body.permissions {
        let names: Vec<&str> = permissions.iter().map(|s| s.as_str()).collect();
        db.set_role_permissions(role_id, &names).await?;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Role updated")))
}

/// Delete a role. Deletion is forbidden while any user still holds the
/// role; the conflict is surfaced as HTTP 409.
async fn delete_role(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let admin = admin_gate(&req, &state).await?;

    let role_id = path.into_inner();
    state.storage.db().delete_role(role_id).await?;

    info!("Admin {} deleted role {}", admin.email, role_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Role deleted")))
}

async fn list_permissions(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let permissions: Vec<Permission> = state.storage.db().list_permissions().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(permissions)))
}

async fn create_permission(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreatePermissionRequest>,
) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let permission = state
        .storage
        .db()
        .create_permission(&body.name, body.description.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(permission)))
}

/// Delete a permission; forbidden while any role still grants it
async fn delete_permission(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    admin_gate(&req, &state).await?;

    let permission_id = path.into_inner();
    state.storage.db().delete_permission(permission_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Permission deleted")))
}
