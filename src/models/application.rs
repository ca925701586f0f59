// src/models/application.rs
use crate::models::{ProjectSummary, UserSummary};
use crate::utils::validation::not_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const ANONYMOUS_APPLICANT: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    New,
    UnderReview,
    Accepted,
    Rejected,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::New
    }
}

// A candidacy for a role on a project; `user_id` is empty for anonymous applicants
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub role: String,
    pub message: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub project_id: String,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 50, message = "role must be at most 50 characters"))]
    pub role: String,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 1000, message = "message must be at most 1000 characters"))]
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}
