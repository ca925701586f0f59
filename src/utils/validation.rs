// src/utils/validation.rs
use crate::models::{FieldError, ServiceError, UserRole};
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::HttpRequest;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{ValidateUrl, ValidationError};

// Reference ids are UUIDs; anything else is rejected before a lookup
pub fn parse_id(raw: &str) -> Result<String, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ServiceError::InvalidId(raw.to_string()))
}

// Split a comma separated query value, dropping blanks
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::validation(vec![FieldError::new("body", err.to_string())]).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::query_validation(vec![FieldError::new("query", err.to_string())]).into()
}

fn rejected(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

// Custom field checks used by the request payloads' `#[validate(custom(..))]`

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejected("blank", "must not be blank"));
    }
    Ok(())
}

// Empty clears the field; anything else must be an absolute URL
pub fn optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(rejected("url", "must be a valid URL"))
    }
}

pub fn not_admin(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_admin() {
        return Err(rejected("role", "admin accounts cannot be self-registered"));
    }
    Ok(())
}

fn entries_within(values: &[String], max: usize) -> Result<(), ValidationError> {
    let bad = values
        .iter()
        .any(|value| value.trim().is_empty() || value.chars().count() > max);
    if bad {
        return Err(rejected("entries", format!("entries must be 1 to {} characters", max)));
    }
    Ok(())
}

pub fn entries_within_50(values: &[String]) -> Result<(), ValidationError> {
    entries_within(values, 50)
}

pub fn entries_within_100(values: &[String]) -> Result<(), ValidationError> {
    entries_within(values, 100)
}

pub fn entries_within_200(values: &[String]) -> Result<(), ValidationError> {
    entries_within(values, 200)
}
