// src/storage/users.rs
use super::{Store, USERS};
use crate::models::{ConflictKind, Missing, ServiceError, User, UserSummary};
use log::info;

impl Store {
    // Insert a new user; the email must not be taken (case-insensitive)
    pub fn insert_user(&self, user: User) -> Result<User, ServiceError> {
        let mut state = self.write()?;

        let taken = state
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(ServiceError::Conflict(ConflictKind::Duplicate("email")));
        }

        self.persist(USERS, &user.id, &user)?;
        state.users.insert(user.id.clone(), user.clone());

        info!("✅ Saved user: {}", user.id);
        Ok(user)
    }

    pub fn find_user(&self, id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.read()?.users.get(id).cloned())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    #[cfg(test)]
    pub fn find_user_by_legacy_id(&self, legacy_id: u64) -> Result<Option<User>, ServiceError> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .find(|user| user.legacy_id == Some(legacy_id))
            .cloned())
    }

    // Summaries for the given ids, in the given order; unknown ids are skipped
    pub fn user_summaries(&self, ids: &[String]) -> Result<Vec<UserSummary>, ServiceError> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(UserSummary::from)
            .collect())
    }

    // Apply `change` to a copy of the user and store it if the closure succeeds
    pub fn update_user_with<F>(&self, id: &str, change: F) -> Result<User, ServiceError>
    where
        F: FnOnce(&mut User) -> Result<(), ServiceError>,
    {
        let mut state = self.write()?;
        let mut user = state
            .users
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(Missing::User))?;

        change(&mut user)?;

        self.persist(USERS, &user.id, &user)?;
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn user_count(&self) -> Result<usize, ServiceError> {
        Ok(self.read()?.users.len())
    }
}
