// src/routes/mod.rs
pub mod application_routes;
pub mod auth_routes;
pub mod dictionary_routes;
pub mod project_routes;
pub mod user_routes;

use crate::models::{Missing, ServiceError};
use crate::utils::validation::{json_error_handler, query_error_handler};
use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;
use lazy_static::lazy_static;
use log::debug;
use serde_json::json;
use std::time::Instant;

lazy_static! {
    static ref STARTED_AT: Instant = Instant::now();
}

// Liveness probe, mounted outside the API prefix
#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": STARTED_AT.elapsed().as_secs_f64(),
    }))
}

async fn route_not_found(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    debug!("🚫 No route for {} {}", req.method(), req.path());
    Err(ServiceError::NotFound(Missing::Route))
}

// Mount every API route under `prefix`, plus the health check and the
// catch-all that answers unknown paths with ROUTE_NOT_FOUND.
pub fn init_routes(cfg: &mut web::ServiceConfig, prefix: &str) {
    lazy_static::initialize(&STARTED_AT);

    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(health)
        .service(
            web::scope(prefix)
                .configure(auth_routes::init_routes)
                .configure(user_routes::init_routes)
                .configure(project_routes::init_routes)
                .configure(application_routes::init_routes)
                .configure(dictionary_routes::init_routes),
        )
        .default_service(web::route().to(route_not_found));
}
