// src/services/mod.rs
pub mod access;
pub mod application_service;
pub mod project_service;

pub use application_service::ApplicationService;
pub use project_service::ProjectService;
