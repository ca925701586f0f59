// src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEvent {
    Login,
    Logout,
}

// Append-only audit entry
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub event: SessionEvent,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: &str, event: SessionEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event,
            created_at: Utc::now(),
        }
    }
}
