//! Authentication endpoints
//!
//! Registration, login/logout, password changes and the two protected
//! pages carried over from the original blueprint: `/auth/profile` (any
//! authenticated user) and `/auth/user_list` (administrators only).

use crate::auth::RegistrationForm;
use crate::core::models::User;
use crate::server::gate;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configure authentication routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::get().to(login_page))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/change-password", web::post().to(change_password))
            .route("/profile", web::get().to(profile))
            .route("/user_list", web::get().to(user_list)),
    );
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (also set as the `session` cookie)
    pub token: String,
    /// The logged-in user
    pub user: UserInfo,
}

/// Change-password request payload
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password
    pub old_password: String,
    /// New password
    pub new_password: String,
}

/// Query parameters accepted by the login entry point
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    /// Post-login redirect destination
    pub next: Option<String>,
}

/// Public view of a user record
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID
    pub id: i32,
    /// Username
    pub username: Option<String>,
    /// Email address
    pub email: String,
    /// Whether the account is active
    pub active: bool,
    /// Granted role names
    pub roles: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Current login timestamp
    pub current_login_at: Option<DateTime<Utc>>,
    /// Number of logins
    pub login_count: i32,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            active: user.active,
            roles: user.roles.iter().map(|r| r.name.clone()).collect(),
            created_at: user.created_at,
            current_login_at: user.current_login_at,
            login_count: user.login_count,
        }
    }
}

/// User registration endpoint; self-registered users start with no roles
async fn register(
    state: web::Data<AppState>,
    form: web::Json<RegistrationForm>,
) -> Result<HttpResponse> {
    let user = state.auth.register(&form).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(UserInfo::from(&user))))
}

/// Login entry point. Unauthenticated requests to protected endpoints are
/// redirected here with a `next` query parameter.
async fn login_page(query: web::Query<LoginPageQuery>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Log in by POSTing email and password to /auth/login",
        "next": query.next,
    })))
}

/// Login endpoint: verifies credentials, records login metadata and issues
/// a session token (JSON body and `session` cookie)
async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    let (user, token) = state
        .auth
        .login(&body.email, &body.password, ip.as_deref())
        .await?;

    let cookie = Cookie::build("session", token.clone())
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::success(
        LoginResponse {
            token,
            user: UserInfo::from(&user),
        },
    )))
}

/// Logout endpoint: drops the session cookie
async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie("session") {
        state.auth.logout(cookie.value()).await?;
    }

    let mut removal = Cookie::new("session", "");
    removal.set_path("/");
    removal.make_removal();

    info!("Session cookie cleared");
    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(ApiResponse::success("Logged out")))
}

/// Change the current user's password
async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    // Gate: authentication only; any active user may change their own password
    let user = gate::login_required(&req, &state).await?;

    state
        .auth
        .change_password(user.id, &body.old_password, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Password changed")))
}

/// User profile page
async fn profile(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    // Gate: authentication only; unauthenticated callers are redirected to
    // the login entry point with next=/auth/profile
    let user = gate::login_required(&req, &state).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(&user))))
}

/// User list page, administrators only
async fn user_list(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    // Gate: authentication (redirect variant), then the hard 403 role check
    let user = gate::login_required(&req, &state).await?;
    gate::roles_required(&user, "admin")?;

    let users = state.storage.db().list_users().await?;
    let infos: Vec<UserInfo> = users.iter().map(UserInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(infos)))
}
