// src/routes/dictionary_routes.rs
use crate::models::ServiceError;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde_json::json;

#[get("/roles")]
async fn list_roles(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(json!({ "roles": state.store.roles()? })))
}

#[get("/technologies")]
async fn list_technologies(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(json!({ "technologies": state.store.technologies()? })))
}

#[get("/categories")]
async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(json!({ "categories": state.store.categories()? })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_roles)
        .service(list_technologies)
        .service(list_categories);
}
