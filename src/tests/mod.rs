// src/tests/mod.rs
// HTTP-level tests: the full route table over an in-memory store.
use crate::config::Config;
use crate::models::{CreateProjectRequest, Project, User, UserRole};
use crate::services::access::Caller;
use crate::services::ProjectService;
use crate::state::AppState;
use crate::storage::Store;
use crate::utils::{jwt, password};
use actix_web::web;
use chrono::Utc;
use uuid::Uuid;

pub const PASSWORD: &str = "secret1";

// Build a test service with the same middleware and routes as the server
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(crate::utils::Authentication::new($state.config.jwt.clone()))
                .configure(|cfg| crate::routes::init_routes(cfg, "/api")),
        )
        .await
    };
}

mod application_tests;
mod middleware_tests;

pub fn test_state() -> web::Data<AppState> {
    let config = Config {
        bcrypt_cost: 4,
        ..Config::default()
    };
    web::Data::new(AppState::new(Store::in_memory(), config))
}

// Insert a user directly and mint a token for it
pub fn seed_user(state: &AppState, name: &str, role: UserRole) -> (User, String) {
    let user = User {
        id: Uuid::new_v4().to_string(),
        legacy_id: None,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: password::hash_password(PASSWORD, 4).unwrap(),
        role,
        avatar: None,
        skills: Vec::new(),
        bio: None,
        experience: 0,
        location: None,
        portfolio: None,
        created_at: Utc::now(),
    };
    let user = state.store.insert_user(user).unwrap();
    let token = jwt::generate_token(&user, &state.config.jwt).unwrap();
    (user, token)
}

pub fn seed_project(state: &AppState, owner: &User, name: &str, team_size: u32, tech: &[&str]) -> Project {
    let request = CreateProjectRequest {
        name: name.to_string(),
        description: format!("{} description", name),
        status: None,
        looking_for: String::new(),
        category: "web".to_string(),
        tech: tech.iter().map(|t| t.to_string()).collect(),
        needed_roles: vec!["developer".to_string()],
        team_size,
        budget: String::new(),
        timeline: String::new(),
        complexity: None,
        image: String::new(),
        features: Vec::new(),
        requirements: Vec::new(),
    };
    ProjectService::new(&state.store, state.policy())
        .create(&Caller::new(owner.id.clone(), owner.role), request)
        .unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
