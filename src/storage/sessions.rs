// src/storage/sessions.rs
use super::{Store, SESSIONS};
use crate::models::{ServiceError, Session};
use log::debug;

impl Store {
    // Sessions are an audit trail: appended, never rewritten
    pub fn append_session(&self, session: Session) -> Result<(), ServiceError> {
        let mut state = self.write()?;
        self.persist(SESSIONS, &session.id, &session)?;
        debug!("🧾 {:?} recorded for user: {}", session.event, session.user_id);
        state.sessions.push(session);
        Ok(())
    }

    pub fn sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>, ServiceError> {
        let state = self.read()?;
        Ok(state
            .sessions
            .iter()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect())
    }
}
