// src/routes/application_routes.rs
use crate::models::{CreateApplicationRequest, ServiceError, UpdateApplicationStatusRequest};
use crate::services::ApplicationService;
use crate::state::AppState;
use crate::utils::validation::parse_id;
use crate::utils::{authenticated_user, caller_of, optional_user};
use actix_web::{get, patch, post, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

// Apply to a project. Works without a token; a valid token ties the application to its user.
#[post("/applications")]
async fn create_application(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateApplicationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let applicant = optional_user(&req, &state.store)?;
    let service = ApplicationService::new(&state.store, state.policy());

    info!(
        "📨 New application for project: {} ({})",
        body.project_id,
        applicant.as_ref().map_or("anonymous", |user| user.id.as_str())
    );

    let application = service
        .create(applicant.as_ref(), body.into_inner())
        .map_err(|e| {
            error!("❌ Application rejected: {}", e);
            e
        })?;

    info!("✅ Application stored: {}", application.id);

    Ok(HttpResponse::Created().json(json!({ "application": application })))
}

// All applications of one project
#[get("/applications/projects/{project_id}")]
async fn list_project_applications(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let project_id = parse_id(&path.into_inner())?;

    let applications = ApplicationService::new(&state.store, state.policy())
        .list_for_project(&caller_of(&user), &project_id)?;

    info!("📋 {} applications for project {}", applications.len(), project_id);

    Ok(HttpResponse::Ok().json(json!({ "applications": applications })))
}

// Applications submitted by the caller
#[get("/applications")]
async fn list_my_applications(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let applications =
        ApplicationService::new(&state.store, state.policy()).list_for_caller(&caller_of(&user))?;

    Ok(HttpResponse::Ok().json(json!({ "applications": applications })))
}

#[patch("/applications/{application_id}")]
async fn update_application_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateApplicationStatusRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let application_id = parse_id(&path.into_inner())?;

    let application = ApplicationService::new(&state.store, state.policy()).update_status(
        &caller_of(&user),
        &application_id,
        body.status,
    )?;

    Ok(HttpResponse::Ok().json(json!({ "application": application })))
}

// Register all application routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_application)
        .service(list_project_applications)
        .service(list_my_applications)
        .service(update_application_status);
}
