// src/models/mod.rs
use crate::services::access::DenyReason;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

pub mod application;
pub use application::*;

pub mod dictionary;
pub use dictionary::*;

pub mod project;
pub use project::*;

pub mod session;
pub use session::*;

pub mod user;
pub use user::*;

// JWT claims structure for authentication
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub role: UserRole,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

// One entry of a validation error's `details` list
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    #[display(fmt = "User not found")]
    User,
    #[display(fmt = "Project not found")]
    Project,
    #[display(fmt = "Application not found")]
    Application,
    #[display(fmt = "User is not a member of the project team")]
    Member,
    #[display(fmt = "Route not found")]
    Route,
}

impl Missing {
    pub fn code(self) -> &'static str {
        match self {
            Missing::User => "USER_NOT_FOUND",
            Missing::Project => "PROJECT_NOT_FOUND",
            Missing::Application => "APPLICATION_NOT_FOUND",
            Missing::Member => "USER_NOT_MEMBER",
            Missing::Route => "ROUTE_NOT_FOUND",
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[display(fmt = "Authentication required")]
    AuthenticationRequired,
    #[display(fmt = "Invalid token")]
    InvalidToken,
    #[display(fmt = "Token expired")]
    TokenExpired,
    #[display(fmt = "Invalid email or password")]
    InvalidCredentials,
}

impl AuthFailure {
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AuthFailure::InvalidToken => "INVALID_TOKEN",
            AuthFailure::TokenExpired => "TOKEN_EXPIRED",
            AuthFailure::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    #[display(fmt = "User is already a member of the project team")]
    AlreadyMember,
    #[display(fmt = "Field {} must be unique", _0)]
    Duplicate(&'static str),
}

// Custom error types
#[derive(Debug)]
pub enum ServiceError {
    NotFound(Missing),
    Unauthorized(AuthFailure),
    Forbidden(DenyReason),
    Validation {
        code: &'static str,
        details: Vec<FieldError>,
    },
    Conflict(ConflictKind),
    TeamSizeExceeded,
    CannotRemoveOwner,
    InvalidId(String),
    RateLimitExceeded,
    InternalServerError,
}

impl ServiceError {
    pub fn validation(details: Vec<FieldError>) -> Self {
        ServiceError::Validation {
            code: "VALIDATION_ERROR",
            details,
        }
    }

    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn query_validation(details: Vec<FieldError>) -> Self {
        ServiceError::Validation {
            code: "QUERY_VALIDATION_ERROR",
            details,
        }
    }

    // Stable, client-facing error code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(missing) => missing.code(),
            ServiceError::Unauthorized(failure) => failure.code(),
            ServiceError::Forbidden(reason) => reason.code(),
            ServiceError::Validation { code, .. } => *code,
            ServiceError::Conflict(ConflictKind::AlreadyMember) => "USER_ALREADY_MEMBER",
            ServiceError::Conflict(ConflictKind::Duplicate(_)) => "DUPLICATE_ERROR",
            ServiceError::TeamSizeExceeded => "TEAM_SIZE_EXCEEDED",
            ServiceError::CannotRemoveOwner => "CANNOT_REMOVE_OWNER",
            ServiceError::InvalidId(_) => "INVALID_ID",
            ServiceError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServiceError::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::Validation { details, .. } => Some(json!(details)),
            ServiceError::Conflict(ConflictKind::Duplicate(field)) => Some(json!({ "field": field })),
            _ => None,
        }
    }
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::NotFound(missing) => write!(f, "{}", missing),
            ServiceError::Unauthorized(failure) => write!(f, "{}", failure),
            ServiceError::Forbidden(reason) => write!(f, "{}", reason),
            ServiceError::Validation { code, .. } if *code == "QUERY_VALIDATION_ERROR" => {
                write!(f, "Invalid query parameters")
            }
            ServiceError::Validation { .. } => write!(f, "Validation failed"),
            ServiceError::Conflict(kind) => write!(f, "{}", kind),
            ServiceError::TeamSizeExceeded => write!(f, "The team has reached its maximum size"),
            ServiceError::CannotRemoveOwner => write!(f, "The project owner cannot be removed from the team"),
            ServiceError::InvalidId(id) => write!(f, "Invalid id format: {}", id),
            ServiceError::RateLimitExceeded => write!(f, "Too many requests, please try again later"),
            ServiceError::InternalServerError => write!(f, "Internal Server Error"),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::AuthenticationRequired => {
                ServiceError::Unauthorized(AuthFailure::AuthenticationRequired)
            }
            other => ServiceError::Forbidden(other),
        }
    }
}

// Payload field names are reported the way clients spell them
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, problems)| {
                let field = camel_case(&field);
                problems.iter().map(move |problem| {
                    let message = match &problem.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is invalid", field),
                    };
                    FieldError::new(field.clone(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::validation(details)
    }
}

// Implement ResponseError for ServiceError
impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Validation { .. }
            | ServiceError::TeamSizeExceeded
            | ServiceError::CannotRemoveOwner
            | ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut error = json!({
            "message": self.to_string(),
            "code": self.code(),
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": error }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn validation_errors_become_camel_case_details() {
        let request = CreateProjectRequest {
            name: "   ".to_string(),
            description: "Something".to_string(),
            status: None,
            looking_for: String::new(),
            category: "web".to_string(),
            tech: vec!["rust".to_string()],
            needed_roles: Vec::new(),
            team_size: 51,
            budget: String::new(),
            timeline: String::new(),
            complexity: None,
            image: "nope".to_string(),
            features: Vec::new(),
            requirements: Vec::new(),
        };

        let err = ServiceError::from(request.validate().unwrap_err());
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            ServiceError::Validation { details, .. } => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["image", "name", "neededRoles", "teamSize"]);
                assert!(details.iter().all(|d| !d.message.is_empty()));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn absent_optional_fields_are_not_checked() {
        assert!(UpdateProjectRequest::default().validate().is_ok());
        assert!(UpdateUserRequest::default().validate().is_ok());

        let update = UpdateProjectRequest {
            tech: Some(Vec::new()),
            ..UpdateProjectRequest::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn rate_limit_is_too_many_requests() {
        let err = ServiceError::RateLimitExceeded;
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.code(), "RATE_LIMIT_EXCEEDED");
    }
}
