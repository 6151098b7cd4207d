//! HTTP surface integration tests
//!
//! Spins up the full Actix application over an in-memory SQLite database and
//! drives the authentication and access-control behavior end to end.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use cms_rs::auth::provision::{self, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD};
use cms_rs::auth::AuthSystem;
use cms_rs::config::Config;
use cms_rs::server::server::HttpServer;
use cms_rs::server::AppState;
use cms_rs::storage::StorageLayer;
use serde_json::{json, Value};
use std::sync::Arc;

/// Build application state over a fresh in-memory database with the catalog
/// seeded and the bootstrap admin in place. One pooled connection only, or
/// SQLite hands each connection a separate empty database.
async fn setup_state() -> AppState {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;

    let storage = Arc::new(
        StorageLayer::new(&config.database)
            .await
            .expect("Failed to create storage"),
    );
    storage.db().migrate().await.expect("Migration failed");
    provision::seed_catalog(storage.db()).await.expect("Seeding failed");
    provision::create_bootstrap_admin(storage.db())
        .await
        .expect("Bootstrap admin failed");

    let auth = AuthSystem::new(&config.security, Arc::clone(&storage));
    AppState::new(config, auth, storage)
}

/// Log in through the HTTP surface and return the session token
async fn login_token<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    assert_eq!(body["success"], json!(true), "login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], json!("ok"));

    let req = test::TestRequest::get().uri("/no/such/route").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn test_registration_and_login_flow() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct-horse",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], json!("alice"));
    assert_eq!(body["data"]["roles"], json!([]));

    // Duplicate email is a conflict
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "correct-horse",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Wrong password is rejected
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "alice@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials issue a token usable as a bearer credential
    let token = login_token(&app, "alice@example.com", "correct-horse").await;
    let req = test::TestRequest::get()
        .uri("/auth/profile")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["email"], json!("alice@example.com"));
}

#[actix_web::test]
async fn test_unauthenticated_profile_redirects_to_login() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

    let req = test::TestRequest::get().uri("/auth/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(location, "/auth/login?next=%2Fauth%2Fprofile");

    // The login entry point decodes and echoes the destination back
    let req = test::TestRequest::get().uri(location).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["next"], json!("/auth/profile"));
}

#[actix_web::test]
async fn test_user_list_requires_admin_role() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

    // Self-registered users have no roles and get a hard 403
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "bobs-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let token = login_token(&app, "bob@example.com", "bobs-password").await;
    let req = test::TestRequest::get()
        .uri("/auth/user_list")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The bootstrap admin gets through
    let token = login_token(&app, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD).await;
    let req = test::TestRequest::get()
        .uri("/auth/user_list")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["data"].as_array().unwrap().len() >= 2);
}

#[actix_web::test]
async fn test_admin_scope_gating() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;

    // Unauthenticated: redirect preserving the requested path
    let req = test::TestRequest::get().uri("/admin/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(location, "/auth/login?next=%2Fadmin%2Fusers");

    // Authenticated non-admin: hard 403
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "carols-password",
        }))
        .to_request();
    test::call_service(&app, req).await;
    let token = login_token(&app, "carol@example.com", "carols-password").await;
    let req = test::TestRequest::get()
        .uri("/admin/users")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_admin_user_and_role_crud() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;
    let token = login_token(&app, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD).await;
    let auth_header = (header::AUTHORIZATION, format!("Bearer {}", token));

    // Provision an editor through the admin surface
    let req = test::TestRequest::post()
        .uri("/admin/users")
        .insert_header(auth_header.clone())
        .set_json(json!({
            "username": "dave",
            "email": "dave@example.com",
            "password": "daves-password",
            "roles": ["editor"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let dave_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["roles"], json!(["editor"]));

    // Reassign roles
    let req = test::TestRequest::put()
        .uri(&format!("/admin/users/{}", dave_id))
        .insert_header(auth_header.clone())
        .set_json(json!({ "roles": ["viewer"] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["roles"], json!(["viewer"]));

    // Create a role with a permission set
    let req = test::TestRequest::post()
        .uri("/admin/roles")
        .insert_header(auth_header.clone())
        .set_json(json!({
            "name": "moderator",
            "description": "Content moderation",
            "permissions": ["view_content", "approve_content"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let moderator_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["permissions"].as_array().unwrap().len(), 2);

    // Deleting a role a user still holds is a conflict
    let req = test::TestRequest::put()
        .uri(&format!("/admin/users/{}", dave_id))
        .insert_header(auth_header.clone())
        .set_json(json!({ "roles": ["moderator"] }))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::delete()
        .uri(&format!("/admin/roles/{}", moderator_id))
        .insert_header(auth_header.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Unassign, then the delete goes through
    let req = test::TestRequest::put()
        .uri(&format!("/admin/users/{}", dave_id))
        .insert_header(auth_header.clone())
        .set_json(json!({ "roles": [] }))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::delete()
        .uri(&format!("/admin/roles/{}", moderator_id))
        .insert_header(auth_header.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_deactivated_user_session_is_rejected() {
    let state = setup_state().await;
    let app = test::init_service(HttpServer::create_app(web::Data::new(state))).await;
    let admin_token = login_token(&app, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD).await;

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "eve",
            "email": "eve@example.com",
            "password": "eves-password",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let eve_id = body["data"]["id"].as_i64().unwrap();

    let eve_token = login_token(&app, "eve@example.com", "eves-password").await;

    // Deactivate through the admin surface
    let req = test::TestRequest::put()
        .uri(&format!("/admin/users/{}", eve_id))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", admin_token)))
        .set_json(json!({ "active": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The still-valid token no longer authenticates; protected pages
    // bounce back to login
    let req = test::TestRequest::get()
        .uri("/auth/profile")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", eve_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}
