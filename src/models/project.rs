// src/models/project.rs
use crate::models::{ServiceError, UserSummary};
use crate::utils::validation::{entries_within_200, entries_within_50, not_blank, optional_url};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const MAX_TEAM_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    Paused,
    SeekingTeam,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::SeekingTeam
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub looking_for: String,
    pub category: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub needed_roles: Vec<String>,
    pub team_size: u32,
    pub current_team: u32,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub owner_id: String,
    // Owner id as it was before the id migration, kept for old lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_owner_id: Option<u64>,
    pub team_members: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.team_members.iter().any(|member| member == user_id)
    }

    pub fn has_free_seat(&self) -> bool {
        self.current_team < self.team_size
    }
}

// Project with owner and members expanded for responses
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub owner: Option<UserSummary>,
    pub members: Vec<UserSummary>,
}

// Short form embedded into application responses
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub category: String,
    pub owner_id: String,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            category: project.category.clone(),
            owner_id: project.owner_id.clone(),
        }
    }
}

// Create payload. Owner, membership and seat count are not accepted from the
// client; the engine assigns them.
#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    #[validate(length(max = 500, message = "lookingFor must be at most 500 characters"))]
    pub looking_for: String,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub category: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "tech must contain at least one entry"))]
    #[validate(custom(function = "entries_within_50"))]
    pub tech: Vec<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "neededRoles must contain at least one entry"))]
    #[validate(custom(function = "entries_within_50"))]
    pub needed_roles: Vec<String>,
    #[validate(range(min = 1, max = 50, message = "teamSize must be between 1 and 50"))]
    pub team_size: u32,
    #[serde(default)]
    #[validate(length(max = 100, message = "budget must be at most 100 characters"))]
    pub budget: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "timeline must be at most 100 characters"))]
    pub timeline: String,
    pub complexity: Option<Complexity>,
    #[serde(default)]
    #[validate(length(max = 500, message = "image must be at most 500 characters"))]
    #[validate(custom(function = "optional_url"))]
    pub image: String,
    #[serde(default)]
    #[validate(custom(function = "entries_within_200"))]
    pub features: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "entries_within_200"))]
    pub requirements: Vec<String>,
}

// Partial update. `id`, `ownerId`, `createdAt`, `currentTeam` and `teamMembers`
// have no field here and are discarded when the body is parsed.
#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[validate(length(max = 500, message = "lookingFor must be at most 500 characters"))]
    pub looking_for: Option<String>,
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    pub category: Option<String>,
    #[validate(length(min = 1, message = "tech must contain at least one entry"))]
    #[validate(custom(function = "entries_within_50"))]
    pub tech: Option<Vec<String>>,
    #[validate(length(min = 1, message = "neededRoles must contain at least one entry"))]
    #[validate(custom(function = "entries_within_50"))]
    pub needed_roles: Option<Vec<String>>,
    #[validate(range(min = 1, max = 50, message = "teamSize must be between 1 and 50"))]
    pub team_size: Option<u32>,
    #[validate(length(max = 100, message = "budget must be at most 100 characters"))]
    pub budget: Option<String>,
    #[validate(length(max = 100, message = "timeline must be at most 100 characters"))]
    pub timeline: Option<String>,
    pub complexity: Option<Complexity>,
    #[validate(length(max = 500, message = "image must be at most 500 characters"))]
    #[validate(custom(function = "optional_url"))]
    pub image: Option<String>,
    #[validate(custom(function = "entries_within_200"))]
    pub features: Option<Vec<String>>,
    #[validate(custom(function = "entries_within_200"))]
    pub requirements: Option<Vec<String>>,
}

// Owner identifier as clients may send it: pre-migration numeric ids are still
// in circulation next to reference ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerKey {
    Legacy(u64),
    Reference(String),
}

impl OwnerKey {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse()
                .map(OwnerKey::Legacy)
                .map_err(|_| ServiceError::InvalidId(raw.to_string()));
        }
        Uuid::parse_str(raw)
            .map(|id| OwnerKey::Reference(id.to_string()))
            .map_err(|_| ServiceError::InvalidId(raw.to_string()))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddTeamMemberRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProjectSort {
    #[serde(rename = "createdAt")]
    CreatedAsc,
    #[serde(rename = "-createdAt")]
    CreatedDesc,
    #[serde(rename = "name")]
    NameAsc,
    #[serde(rename = "-name")]
    NameDesc,
}

impl Default for ProjectSort {
    fn default() -> Self {
        ProjectSort::CreatedDesc
    }
}

// Raw query string of GET /projects
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<ProjectStatus>,
    pub owner_id: Option<String>,
    pub needed_roles: Option<String>,
    pub tech: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<ProjectSort>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

#[derive(Serialize, Debug)]
pub struct ProjectPage {
    pub projects: Vec<ProjectView>,
    pub pagination: Pagination,
}
