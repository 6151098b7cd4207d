//! Landing page and liveness probe

use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;
use tracing::debug;

/// Configure the public page routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/health", web::get().to(health_check));
}

/// Landing page
async fn index() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "title": "cms-rs",
        "message": "Welcome to cms-rs",
    })))
}

/// Liveness probe with a fixed status payload; used by load balancers and
/// monitoring systems
async fn health_check() -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "cms-rs is running",
    })))
}
