// src/storage/applications.rs
use super::{Store, APPLICATIONS};
use crate::models::{Application, Missing, ServiceError};
use log::info;

impl Store {
    pub fn insert_application(&self, application: Application) -> Result<Application, ServiceError> {
        let mut state = self.write()?;
        self.persist(APPLICATIONS, &application.id, &application)?;
        state
            .applications
            .insert(application.id.clone(), application.clone());

        info!("✅ Saved application: {}", application.id);
        Ok(application)
    }

    pub fn find_application(&self, id: &str) -> Result<Option<Application>, ServiceError> {
        Ok(self.read()?.applications.get(id).cloned())
    }

    // Applications of one project, newest first
    pub fn applications_for_project(&self, project_id: &str) -> Result<Vec<Application>, ServiceError> {
        let state = self.read()?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| application.project_id == project_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    // Applications filed by one user, newest first
    pub fn applications_for_user(&self, user_id: &str) -> Result<Vec<Application>, ServiceError> {
        let state = self.read()?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| application.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    pub fn update_application_with<F>(&self, id: &str, change: F) -> Result<Application, ServiceError>
    where
        F: FnOnce(&mut Application) -> Result<(), ServiceError>,
    {
        let mut state = self.write()?;
        let mut application = state
            .applications
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(Missing::Application))?;

        change(&mut application)?;

        self.persist(APPLICATIONS, &application.id, &application)?;
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }
}
