// src/routes/user_routes.rs
use crate::models::{
    AuthFailure, ChangePasswordRequest, Missing, ServiceError, UpdateUserRequest, UserProfile,
};
use crate::services::access::{authorize, Action};
use crate::state::AppState;
use crate::utils::validation::parse_id;
use crate::utils::{authenticated_user, caller_of, password};
use actix_web::{get, patch, put, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;
use validator::Validate;

// Get a profile by ID
#[get("/users/{user_id}")]
async fn get_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let current = authenticated_user(&req, &state.store)?;
    let target_id = parse_id(&path.into_inner())?;
    authorize(state.policy(), Some(&caller_of(&current)), Action::ViewProfile, Some(&target_id))
        .into_result()?;

    info!("🔍 Fetching user: {}", target_id);

    let user = match state.store.find_user(&target_id)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", target_id);
            return Err(ServiceError::NotFound(Missing::User));
        }
    };

    Ok(HttpResponse::Ok().json(json!({ "user": UserProfile::from(&user) })))
}

// Update profile fields of oneself (or anyone, for an admin)
#[patch("/users/{user_id}")]
async fn update_user(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ServiceError> {
    let current = authenticated_user(&req, &state.store)?;
    let caller = caller_of(&current);
    let target_id = parse_id(&path.into_inner())?;
    let update = body.into_inner();

    authorize(state.policy(), Some(&caller), Action::EditProfile, Some(&target_id)).into_result()?;
    if update.role.is_some() {
        authorize(state.policy(), Some(&caller), Action::ChangeRole, Some(&target_id)).into_result()?;
    }

    update.validate()?;

    info!("🔄 Updating profile: {} by {}", target_id, caller.id);

    let user = state.store.update_user_with(&target_id, |user| {
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(skills) = update.skills {
            user.skills = skills;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(experience) = update.experience {
            user.experience = experience;
        }
        if let Some(location) = update.location {
            user.location = Some(location);
        }
        if let Some(portfolio) = update.portfolio {
            user.portfolio = Some(portfolio);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(())
    })?;

    Ok(HttpResponse::Ok().json(json!({ "user": UserProfile::from(&user) })))
}

// Change password; admins resetting someone else's password skip the current-password check
#[put("/users/{user_id}/password")]
async fn change_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ServiceError> {
    let current = authenticated_user(&req, &state.store)?;
    let caller = caller_of(&current);
    let target_id = parse_id(&path.into_inner())?;
    let body = body.into_inner();

    authorize(state.policy(), Some(&caller), Action::EditProfile, Some(&target_id)).into_result()?;
    body.validate()?;

    let target = state
        .store
        .find_user(&target_id)?
        .ok_or(ServiceError::NotFound(Missing::User))?;

    if caller.id == target.id {
        let matches = password::verify_off_thread(body.current_password, target.password_hash.clone()).await?;
        if !matches {
            error!("❌ Wrong current password for user: {}", target.id);
            return Err(ServiceError::Unauthorized(AuthFailure::InvalidCredentials));
        }
    }

    let password_hash = password::hash_off_thread(body.new_password, state.config.bcrypt_cost).await?;
    state.store.update_user_with(&target.id, |user| {
        user.password_hash = password_hash;
        Ok(())
    })?;

    info!("🔑 Password changed for user: {}", target.id);
    Ok(HttpResponse::NoContent().finish())
}

// Register all user routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user)
        .service(update_user)
        .service(change_password);
}
