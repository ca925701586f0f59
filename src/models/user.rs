// src/models/user.rs
use crate::utils::validation::{entries_within_100, not_admin, not_blank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Closed set of account roles. Capability checks match on this exhaustively,
// so adding a role forces every rule to take a position on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Admin,
    TeamLead,
    Client,
    Developer,
    Designer,
    Tester,
    Junior,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }

    // Roles that may open a project on their own account
    pub fn can_create_projects(self) -> bool {
        match self {
            UserRole::TeamLead | UserRole::Client => true,
            UserRole::Admin
            | UserRole::Developer
            | UserRole::Designer
            | UserRole::Tester
            | UserRole::Junior => false,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Junior
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<u64>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: u8,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Public profile; never carries the credential hash
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub experience: u8,
    pub location: Option<String>,
    pub portfolio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
            skills: user.skills.clone(),
            bio: user.bio.clone(),
            experience: user.experience,
            location: user.location.clone(),
            portfolio: user.portfolio.clone(),
            created_at: user.created_at,
        }
    }
}

// Short form embedded into project and application responses
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6 to 128 characters"))]
    pub password: String,
    #[validate(custom(function = "not_admin"))]
    pub role: Option<UserRole>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct UserCredentials {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
}

// Profile patch. Identity fields (email, id, password hash, createdAt) have no
// slot here, so they are dropped during deserialization.
#[derive(Deserialize, Debug, Default, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "not_blank"))]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "avatar must be at most 500 characters"))]
    pub avatar: Option<String>,
    #[validate(custom(function = "entries_within_100"))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(range(max = 50, message = "experience must be between 0 and 50"))]
    pub experience: Option<u8>,
    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 500, message = "portfolio must be at most 500 characters"))]
    pub portfolio: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[validate(length(min = 6, max = 128, message = "newPassword must be 6 to 128 characters"))]
    pub new_password: String,
}
