// src/routes/auth_routes.rs
use crate::models::{
    AuthFailure, LoginResponse, RegisterRequest, ServiceError, Session, SessionEvent, User,
    UserCredentials, UserProfile,
};
use crate::state::AppState;
use crate::utils::{authenticated_user, jwt, optional_user, password};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

// Register a new user
#[post("/auth/register")]
async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    let body = body.into_inner();
    info!("📝 Register request for email: {}", body.email);

    body.validate()?;
    let role = body.role.unwrap_or_default();

    let password_hash = password::hash_off_thread(body.password, state.config.bcrypt_cost).await?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        legacy_id: None,
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        password_hash,
        role,
        avatar: None,
        skills: Vec::new(),
        bio: None,
        experience: 0,
        location: None,
        portfolio: None,
        created_at: Utc::now(),
    };

    let user = state.store.insert_user(user).map_err(|e| {
        error!("❌ Registration failed for {}: {}", body.email, e);
        e
    })?;
    let token = jwt::generate_token(&user, &state.config.jwt)?;

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Created()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(LoginResponse {
            user: UserProfile::from(&user),
            access_token: token,
        }))
}

// Login and get JWT token
#[post("/auth/login")]
async fn login(
    state: web::Data<AppState>,
    credentials: web::Json<UserCredentials>,
) -> Result<HttpResponse, ServiceError> {
    let credentials = credentials.into_inner();
    info!("🔑 Login request for email: {}", credentials.email);

    credentials.validate()?;

    // Find the user by email
    let user = match state.store.find_user_by_email(&credentials.email)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(ServiceError::Unauthorized(AuthFailure::InvalidCredentials));
        }
    };

    // Verify password
    if !password::verify_off_thread(credentials.password, user.password_hash.clone()).await? {
        error!("❌ Invalid password for user: {}", credentials.email);
        return Err(ServiceError::Unauthorized(AuthFailure::InvalidCredentials));
    }

    let token = jwt::generate_token(&user, &state.config.jwt)?;
    state.store.append_session(Session::new(&user.id, SessionEvent::Login))?;

    info!("✅ User logged in successfully: {}", user.id);

    // Return token in headers as well as response body
    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(LoginResponse {
            user: UserProfile::from(&user),
            access_token: token,
        }))
}

// Logout only leaves an audit record; tokens stay valid until they expire
#[post("/auth/logout")]
async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    if let Some(user) = optional_user(&req, &state.store)? {
        state.store.append_session(Session::new(&user.id, SessionEvent::Logout))?;
        info!("👋 User logged out: {}", user.id);
    }

    Ok(HttpResponse::NoContent().finish())
}

// Get current user info (requires authentication)
#[get("/auth/me")]
async fn me(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    debug!("👤 Get user info request");

    let user = authenticated_user(&req, &state.store)?;
    Ok(HttpResponse::Ok().json(json!({ "user": UserProfile::from(&user) })))
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me);
}
