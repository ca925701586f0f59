// src/routes/project_routes.rs
use crate::models::{
    AddTeamMemberRequest, CreateProjectRequest, OwnerKey, ProjectListQuery, ServiceError,
    UpdateProjectRequest,
};
use crate::services::ProjectService;
use crate::state::AppState;
use crate::utils::validation::parse_id;
use crate::utils::{authenticated_user, caller_of};
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

// List projects with filters, pagination and sorting
#[get("/projects")]
async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let service = ProjectService::new(&state.store, state.policy());
    let page = service.list(&query)?;

    info!(
        "📋 Listed {} of {} projects (page {})",
        page.projects.len(),
        page.pagination.total,
        page.pagination.page
    );

    Ok(HttpResponse::Ok().json(page))
}

// Projects of one owner; accepts legacy numeric ids as well as reference ids
#[get("/projects/owner/{owner_id}")]
async fn list_owner_projects(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let key = OwnerKey::parse(&path.into_inner())?;
    let projects = ProjectService::new(&state.store, state.policy()).list_by_owner(&key)?;

    info!("📋 Found {} projects for owner {:?}", projects.len(), key);

    Ok(HttpResponse::Ok().json(json!({ "projects": projects })))
}

#[get("/projects/{project_id}")]
async fn get_project(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = parse_id(&path.into_inner())?;
    let project = ProjectService::new(&state.store, state.policy()).get(&project_id)?;

    Ok(HttpResponse::Ok().json(json!({ "project": project })))
}

// Create a new project owned by the caller
#[post("/projects")]
async fn create_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let service = ProjectService::new(&state.store, state.policy());

    info!("📝 Creating new project: {} for user: {}", body.name, user.id);

    let project = service.create(&caller_of(&user), body.into_inner()).map_err(|e| {
        error!("❌ Project creation rejected for {}: {}", user.id, e);
        e
    })?;

    info!("✅ Project created successfully: {}", project.id);

    Ok(HttpResponse::Created().json(json!({ "project": service.view(project)? })))
}

#[patch("/projects/{project_id}")]
async fn update_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let project_id = parse_id(&path.into_inner())?;
    let service = ProjectService::new(&state.store, state.policy());

    info!("🔄 Updating project: {} by user: {}", project_id, user.id);

    let project = service.update(&caller_of(&user), &project_id, body.into_inner())?;

    Ok(HttpResponse::Ok().json(json!({ "project": service.view(project)? })))
}

#[delete("/projects/{project_id}")]
async fn delete_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let project_id = parse_id(&path.into_inner())?;

    info!("🗑️ Deleting project: {}", project_id);

    let cascaded = ProjectService::new(&state.store, state.policy()).delete(&caller_of(&user), &project_id)?;

    info!("✅ Project {} deleted with {} applications", project_id, cascaded);

    Ok(HttpResponse::NoContent().finish())
}

// Add a user to the project team
#[post("/projects/{project_id}/team")]
async fn add_team_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddTeamMemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let project_id = parse_id(&path.into_inner())?;
    let member_id = parse_id(&body.user_id)?;
    let service = ProjectService::new(&state.store, state.policy());

    info!("👥 Adding user: {} to project: {}", member_id, project_id);

    let project = service
        .add_member(&caller_of(&user), &project_id, &member_id)
        .map_err(|e| {
            error!("❌ Could not add {} to {}: {}", member_id, project_id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(json!({ "project": service.view(project)? })))
}

// Remove a member from the project team
#[delete("/projects/{project_id}/team/{user_id}")]
async fn remove_team_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticated_user(&req, &state.store)?;
    let (project_id, member_id) = path.into_inner();
    let project_id = parse_id(&project_id)?;
    let member_id = parse_id(&member_id)?;
    let service = ProjectService::new(&state.store, state.policy());

    info!("🗑️ Removing user: {} from project: {}", member_id, project_id);

    let project = service
        .remove_member(&caller_of(&user), &project_id, &member_id)
        .map_err(|e| {
            error!("❌ Could not remove {} from {}: {}", member_id, project_id, e);
            e
        })?;

    Ok(HttpResponse::Ok().json(json!({ "project": service.view(project)? })))
}

// Register all project routes. The owner listing goes first so that
// "/projects/owner/.." is not taken for a project id.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_owner_projects)
        .service(list_projects)
        .service(get_project)
        .service(create_project)
        .service(update_project)
        .service(delete_project)
        .service(add_team_member)
        .service(remove_team_member);
}
