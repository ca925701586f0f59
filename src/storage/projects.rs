// src/storage/projects.rs
use super::{Store, APPLICATIONS, PROJECTS};
use crate::models::{Missing, OwnerKey, Project, ServiceError};
use log::info;

// Canonical owner lookup: a project matches if either form matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    pub reference: Option<String>,
    pub legacy: Option<u64>,
}

impl OwnerFilter {
    pub fn matches(&self, project: &Project) -> bool {
        let by_reference = self
            .reference
            .as_deref()
            .map_or(false, |owner| project.owner_id == owner);
        let by_legacy = self
            .legacy
            .map_or(false, |legacy| project.legacy_owner_id == Some(legacy));
        by_reference || by_legacy
    }
}

impl Store {
    pub fn insert_project(&self, project: Project) -> Result<Project, ServiceError> {
        let mut state = self.write()?;
        self.persist(PROJECTS, &project.id, &project)?;
        state.projects.insert(project.id.clone(), project.clone());

        info!("✅ Saved project: {}", project.id);
        Ok(project)
    }

    pub fn find_project(&self, id: &str) -> Result<Option<Project>, ServiceError> {
        Ok(self.read()?.projects.get(id).cloned())
    }

    pub fn all_projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.read()?.projects.values().cloned().collect())
    }

    // Conditional update: `change` sees the current record under the write lock
    // and nothing is written unless it returns Ok.
    pub fn update_project_with<F>(&self, id: &str, change: F) -> Result<Project, ServiceError>
    where
        F: FnOnce(&mut Project) -> Result<(), ServiceError>,
    {
        let mut state = self.write()?;
        let mut project = state
            .projects
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(Missing::Project))?;

        change(&mut project)?;

        self.persist(PROJECTS, &project.id, &project)?;
        state.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    // Delete a project together with every application that targets it.
    // Returns the removed project and the number of cascaded applications.
    pub fn delete_project(&self, id: &str) -> Result<(Project, usize), ServiceError> {
        let mut state = self.write()?;
        let project = state
            .projects
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(Missing::Project))?;

        let orphaned: Vec<String> = state
            .applications
            .values()
            .filter(|application| application.project_id == id)
            .map(|application| application.id.clone())
            .collect();

        for application_id in &orphaned {
            self.unpersist(APPLICATIONS, application_id)?;
            state.applications.remove(application_id);
        }
        self.unpersist(PROJECTS, id)?;
        state.projects.remove(id);

        info!("🗑️ Deleted project {} and {} applications", id, orphaned.len());
        Ok((project, orphaned.len()))
    }

    // Normalize an owner key into both id forms it may be stored under
    pub fn resolve_owner(&self, key: &OwnerKey) -> Result<OwnerFilter, ServiceError> {
        let state = self.read()?;
        let filter = match key {
            OwnerKey::Legacy(legacy) => OwnerFilter {
                reference: state
                    .users
                    .values()
                    .find(|user| user.legacy_id == Some(*legacy))
                    .map(|user| user.id.clone()),
                legacy: Some(*legacy),
            },
            OwnerKey::Reference(id) => OwnerFilter {
                reference: Some(id.clone()),
                legacy: state.users.get(id).and_then(|user| user.legacy_id),
            },
        };
        Ok(filter)
    }

    pub fn projects_by_owner(&self, filter: &OwnerFilter) -> Result<Vec<Project>, ServiceError> {
        let state = self.read()?;
        Ok(state
            .projects
            .values()
            .filter(|project| filter.matches(project))
            .cloned()
            .collect())
    }
}
