// src/services/application_service.rs
use crate::models::{
    Application, ApplicationStatus, ApplicationView, CreateApplicationRequest, Missing,
    ProjectSummary, ServiceError, User, UserSummary, ANONYMOUS_APPLICANT,
};
use crate::services::access::{authorize, AccessPolicy, Action, Caller};
use crate::storage::Store;
use crate::utils::validation::parse_id;
use chrono::Utc;
use log::info;
use uuid::Uuid;
use validator::Validate;

pub struct ApplicationService<'a> {
    store: &'a Store,
    policy: AccessPolicy,
}

impl<'a> ApplicationService<'a> {
    pub fn new(store: &'a Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    // `applicant` is the authenticated user, if any. Their identity replaces
    // whatever name the body carries.
    pub fn create(
        &self,
        applicant: Option<&User>,
        request: CreateApplicationRequest,
    ) -> Result<Application, ServiceError> {
        let caller = applicant.map(|user| Caller::new(user.id.clone(), user.role));
        authorize(self.policy, caller.as_ref(), Action::CreateApplication, None).into_result()?;

        request.validate()?;

        let project_id = parse_id(&request.project_id)?;
        if self.store.find_project(&project_id)?.is_none() {
            return Err(ServiceError::NotFound(Missing::Project));
        }

        let (user_id, name) = match applicant {
            Some(user) => (Some(user.id.clone()), user.name.clone()),
            None => (
                None,
                request
                    .name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| ANONYMOUS_APPLICANT.to_string()),
            ),
        };

        let application = Application {
            id: Uuid::new_v4().to_string(),
            project_id,
            user_id,
            name,
            role: request.role.trim().to_string(),
            message: request.message,
            status: ApplicationStatus::New,
            created_at: Utc::now(),
        };

        self.store.insert_application(application)
    }

    // Role-gated, so the project is only looked up once the caller has passed
    pub fn list_for_project(&self, caller: &Caller, project_id: &str) -> Result<Vec<ApplicationView>, ServiceError> {
        authorize(self.policy, Some(caller), Action::ListProjectApplications, None).into_result()?;
        if self.store.find_project(project_id)?.is_none() {
            return Err(ServiceError::NotFound(Missing::Project));
        }

        self.store
            .applications_for_project(project_id)?
            .into_iter()
            .map(|application| self.with_user(application))
            .collect()
    }

    pub fn list_for_caller(&self, caller: &Caller) -> Result<Vec<ApplicationView>, ServiceError> {
        authorize(self.policy, Some(caller), Action::ListOwnApplications, None).into_result()?;

        self.store
            .applications_for_user(&caller.id)?
            .into_iter()
            .map(|application| self.with_project(application))
            .collect()
    }

    // Ownership is judged on the project the application targets
    pub fn update_status(
        &self,
        caller: &Caller,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationView, ServiceError> {
        let application = self
            .store
            .find_application(application_id)?
            .ok_or(ServiceError::NotFound(Missing::Application))?;
        let project = self
            .store
            .find_project(&application.project_id)?
            .ok_or(ServiceError::NotFound(Missing::Project))?;

        authorize(
            self.policy,
            Some(caller),
            Action::UpdateApplicationStatus,
            Some(&project.owner_id),
        )
        .into_result()?;

        let updated = self.store.update_application_with(application_id, |application| {
            application.status = status;
            Ok(())
        })?;

        info!(
            "📝 Application {} moved to {:?} by {}",
            application_id, status, caller.id
        );

        let mut view = self.with_user(updated)?;
        view.project = Some(ProjectSummary::from(&project));
        Ok(view)
    }

    fn with_user(&self, application: Application) -> Result<ApplicationView, ServiceError> {
        let user = match &application.user_id {
            Some(user_id) => self.store.find_user(user_id)?.as_ref().map(UserSummary::from),
            None => None,
        };
        Ok(ApplicationView {
            application,
            project: None,
            user,
        })
    }

    fn with_project(&self, application: Application) -> Result<ApplicationView, ServiceError> {
        let project = self
            .store
            .find_project(&application.project_id)?
            .as_ref()
            .map(ProjectSummary::from);
        Ok(ApplicationView {
            application,
            project,
            user: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, ProjectStatus, UserRole};

    fn user(store: &Store, role: UserRole) -> User {
        let id = Uuid::new_v4().to_string();
        store
            .insert_user(User {
                id: id.clone(),
                legacy_id: None,
                name: format!("user-{}", &id[..8]),
                email: format!("{}@example.com", id),
                password_hash: String::new(),
                role,
                avatar: None,
                skills: Vec::new(),
                bio: None,
                experience: 0,
                location: None,
                portfolio: None,
                created_at: Utc::now(),
            })
            .unwrap()
    }

    fn project(store: &Store, owner: &User) -> Project {
        let now = Utc::now();
        store
            .insert_project(Project {
                id: Uuid::new_v4().to_string(),
                name: "Board".to_string(),
                description: "Kanban for teams".to_string(),
                status: ProjectStatus::SeekingTeam,
                looking_for: String::new(),
                category: "web".to_string(),
                tech: vec!["rust".to_string()],
                needed_roles: vec!["designer".to_string()],
                team_size: 3,
                current_team: 1,
                budget: String::new(),
                timeline: String::new(),
                complexity: Default::default(),
                image: String::new(),
                features: Vec::new(),
                requirements: Vec::new(),
                owner_id: owner.id.clone(),
                legacy_owner_id: None,
                team_members: vec![owner.id.clone()],
                created_at: now,
                updated_at: now,
            })
            .unwrap()
    }

    fn body(project_id: &str, name: Option<&str>) -> CreateApplicationRequest {
        CreateApplicationRequest {
            project_id: project_id.to_string(),
            name: name.map(str::to_string),
            role: "designer".to_string(),
            message: "hi".to_string(),
        }
    }

    fn caller(user: &User) -> Caller {
        Caller::new(user.id.clone(), user.role)
    }

    #[test]
    fn anonymous_application_keeps_given_name() {
        let store = Store::in_memory();
        let owner = user(&store, UserRole::TeamLead);
        let project = project(&store, &owner);
        let service = ApplicationService::new(&store, AccessPolicy::default());

        let application = service.create(None, body(&project.id, Some("Ann"))).unwrap();
        assert_eq!(application.name, "Ann");
        assert_eq!(application.user_id, None);
        assert_eq!(application.status, ApplicationStatus::New);

        let unnamed = service.create(None, body(&project.id, None)).unwrap();
        assert_eq!(unnamed.name, ANONYMOUS_APPLICANT);
    }

    #[test]
    fn authenticated_applicant_overrides_name() {
        let store = Store::in_memory();
        let owner = user(&store, UserRole::TeamLead);
        let dev = user(&store, UserRole::Designer);
        let project = project(&store, &owner);
        let service = ApplicationService::new(&store, AccessPolicy::default());

        let application = service.create(Some(&dev), body(&project.id, Some("Someone else"))).unwrap();
        assert_eq!(application.name, dev.name);
        assert_eq!(application.user_id.as_deref(), Some(dev.id.as_str()));

        let mine = service.list_for_caller(&caller(&dev)).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].project.as_ref().unwrap().id, project.id);
    }

    #[test]
    fn non_admin_is_refused_before_project_lookup() {
        let store = Store::in_memory();
        let dev = user(&store, UserRole::Developer);
        let admin = user(&store, UserRole::Admin);
        let service = ApplicationService::new(&store, AccessPolicy::default());
        let unknown = Uuid::new_v4().to_string();

        let err = service.list_for_project(&caller(&dev), &unknown).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_PERMISSIONS");

        let err = service.list_for_project(&caller(&admin), &unknown).unwrap_err();
        assert_eq!(err.code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn application_for_missing_project_fails() {
        let store = Store::in_memory();
        let service = ApplicationService::new(&store, AccessPolicy::default());

        let err = service
            .create(None, body(&Uuid::new_v4().to_string(), Some("Ann")))
            .unwrap_err();
        assert_eq!(err.code(), "PROJECT_NOT_FOUND");

        let err = service.create(None, body("7", Some("Ann"))).unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");
    }

    #[test]
    fn only_project_owner_or_admin_changes_status() {
        let store = Store::in_memory();
        let owner = user(&store, UserRole::TeamLead);
        let stranger = user(&store, UserRole::Developer);
        let admin = user(&store, UserRole::Admin);
        let project = project(&store, &owner);
        let service = ApplicationService::new(&store, AccessPolicy::default());
        let application = service.create(None, body(&project.id, Some("Ann"))).unwrap();

        let err = service
            .update_status(&caller(&stranger), &application.id, ApplicationStatus::Accepted)
            .unwrap_err();
        assert_eq!(err.code(), "APPLICATION_ACCESS_DENIED");
        assert_eq!(
            store.find_application(&application.id).unwrap().unwrap().status,
            ApplicationStatus::New
        );

        let view = service
            .update_status(&caller(&owner), &application.id, ApplicationStatus::Accepted)
            .unwrap();
        assert_eq!(view.application.status, ApplicationStatus::Accepted);

        // any-to-any: accepted back to under-review is fine
        let view = service
            .update_status(&caller(&admin), &application.id, ApplicationStatus::UnderReview)
            .unwrap();
        assert_eq!(view.application.status, ApplicationStatus::UnderReview);

        let strict = ApplicationService::new(&store, AccessPolicy { admin_override: false });
        let err = strict
            .update_status(&caller(&admin), &application.id, ApplicationStatus::Rejected)
            .unwrap_err();
        assert_eq!(err.code(), "APPLICATION_ACCESS_DENIED");
    }

    #[test]
    fn listing_project_applications_is_admin_only() {
        let store = Store::in_memory();
        let owner = user(&store, UserRole::TeamLead);
        let admin = user(&store, UserRole::Admin);
        let project = project(&store, &owner);
        let service = ApplicationService::new(&store, AccessPolicy::default());
        service.create(None, body(&project.id, Some("Ann"))).unwrap();
        service.create(None, body(&project.id, Some("Bob"))).unwrap();

        let err = service.list_for_project(&caller(&owner), &project.id).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_PERMISSIONS");

        let listed = service.list_for_project(&caller(&admin), &project.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].application.created_at >= listed[1].application.created_at);
    }
}
