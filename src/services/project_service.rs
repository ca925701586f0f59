// src/services/project_service.rs
use crate::models::{
    ConflictKind, CreateProjectRequest, FieldError, Missing, OwnerKey, Pagination, Project,
    ProjectListQuery, ProjectPage, ProjectSort, ProjectStatus, ProjectView, ServiceError,
    UpdateProjectRequest,
};
use crate::services::access::{authorize, AccessPolicy, Action, Caller};
use crate::storage::{OwnerFilter, Store};
use crate::utils::validation::split_list;
use chrono::Utc;
use log::{info, warn};
use std::cmp::Ordering;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

const NAME_WEIGHT: u32 = 10;
const DESCRIPTION_WEIGHT: u32 = 5;

pub struct ProjectService<'a> {
    store: &'a Store,
    policy: AccessPolicy,
}

impl<'a> ProjectService<'a> {
    pub fn new(store: &'a Store, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    fn load(&self, project_id: &str) -> Result<Project, ServiceError> {
        self.store
            .find_project(project_id)?
            .ok_or(ServiceError::NotFound(Missing::Project))
    }

    // Load the project and check that `caller` may run `action` on it
    fn load_authorized(&self, caller: &Caller, project_id: &str, action: Action) -> Result<Project, ServiceError> {
        let project = self.load(project_id)?;
        authorize(self.policy, Some(caller), action, Some(&project.owner_id)).into_result()?;
        Ok(project)
    }

    // The body is checked before the caller's rights
    pub fn create(&self, caller: &Caller, request: CreateProjectRequest) -> Result<Project, ServiceError> {
        request.validate()?;
        authorize(self.policy, Some(caller), Action::CreateProject, None).into_result()?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            description: request.description,
            status: request.status.unwrap_or_default(),
            looking_for: request.looking_for,
            category: request.category.trim().to_string(),
            tech: request.tech,
            needed_roles: request.needed_roles,
            team_size: request.team_size,
            current_team: 1,
            budget: request.budget,
            timeline: request.timeline,
            complexity: request.complexity.unwrap_or_default(),
            image: request.image,
            features: request.features,
            requirements: request.requirements,
            owner_id: caller.id.clone(),
            legacy_owner_id: None,
            team_members: vec![caller.id.clone()],
            created_at: now,
            updated_at: now,
        };

        self.store.insert_project(project)
    }

    pub fn update(
        &self,
        caller: &Caller,
        project_id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Project, ServiceError> {
        request.validate()?;
        self.load_authorized(caller, project_id, Action::UpdateProject)?;

        self.store
            .update_project_with(project_id, |project| apply_update(project, request))
    }

    // Returns the number of applications removed along with the project
    pub fn delete(&self, caller: &Caller, project_id: &str) -> Result<usize, ServiceError> {
        self.load_authorized(caller, project_id, Action::DeleteProject)?;
        let (_, cascaded) = self.store.delete_project(project_id)?;
        Ok(cascaded)
    }

    pub fn add_member(&self, caller: &Caller, project_id: &str, user_id: &str) -> Result<Project, ServiceError> {
        self.load_authorized(caller, project_id, Action::AddTeamMember)?;

        if self.store.find_user(user_id)?.is_none() {
            return Err(ServiceError::NotFound(Missing::User));
        }

        let project = self
            .store
            .update_project_with(project_id, |project| admit_member(project, user_id))?;

        info!(
            "👥 User {} joined project {} ({}/{})",
            user_id, project_id, project.current_team, project.team_size
        );
        Ok(project)
    }

    pub fn remove_member(&self, caller: &Caller, project_id: &str, user_id: &str) -> Result<Project, ServiceError> {
        self.load_authorized(caller, project_id, Action::RemoveTeamMember)?;

        let project = self
            .store
            .update_project_with(project_id, |project| release_member(project, user_id))?;

        info!(
            "👋 User {} left project {} ({}/{})",
            user_id, project_id, project.current_team, project.team_size
        );
        Ok(project)
    }

    pub fn get(&self, project_id: &str) -> Result<ProjectView, ServiceError> {
        let project = self.load(project_id)?;
        self.view(project)
    }

    pub fn view(&self, project: Project) -> Result<ProjectView, ServiceError> {
        let owner = self
            .store
            .user_summaries(std::slice::from_ref(&project.owner_id))?
            .pop();
        let members = self.store.user_summaries(&project.team_members)?;
        Ok(ProjectView {
            project,
            owner,
            members,
        })
    }

    pub fn list(&self, query: &ProjectListQuery) -> Result<ProjectPage, ServiceError> {
        let (page, limit) = page_bounds(query.page, query.limit)?;

        let owner = match query.owner_id.as_deref() {
            Some(raw) => Some(self.store.resolve_owner(&OwnerKey::parse(raw)?)?),
            None => None,
        };
        let filter = ProjectFilter::from_query(query, owner);

        let mut ranked: Vec<(u32, Project)> = self
            .store
            .all_projects()?
            .into_iter()
            .filter_map(|project| filter.rank(&project).map(|score| (score, project)))
            .collect();

        let sort = query.sort.unwrap_or_default();
        ranked.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .cmp(score_a)
                .then_with(|| compare_projects(a, b, sort))
        });

        let total = ranked.len();
        let skip = ((page - 1) as usize).saturating_mul(limit as usize);
        let projects = ranked
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .map(|(_, project)| self.view(project))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectPage {
            projects,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: (total + limit as usize - 1) / limit as usize,
            },
        })
    }

    // Projects of one owner, whichever id form they were stored under
    pub fn list_by_owner(&self, key: &OwnerKey) -> Result<Vec<ProjectView>, ServiceError> {
        let filter = self.store.resolve_owner(key)?;
        if filter.reference.is_none() {
            warn!("⚠️ Owner key {:?} does not resolve to a known user", key);
        }

        let mut projects = self.store.projects_by_owner(&filter)?;
        projects.sort_by(|a, b| compare_projects(a, b, ProjectSort::CreatedDesc));
        projects.into_iter().map(|project| self.view(project)).collect()
    }
}

// Take one seat for `user_id`. Runs inside the store's conditional update, so
// the membership and capacity checks see the same state the write replaces.
pub fn admit_member(project: &mut Project, user_id: &str) -> Result<(), ServiceError> {
    if project.is_member(user_id) {
        return Err(ServiceError::Conflict(ConflictKind::AlreadyMember));
    }
    if !project.has_free_seat() {
        return Err(ServiceError::TeamSizeExceeded);
    }

    project.team_members.push(user_id.to_string());
    project.current_team += 1;
    project.updated_at = Utc::now();
    Ok(())
}

pub fn release_member(project: &mut Project, user_id: &str) -> Result<(), ServiceError> {
    let index = project
        .team_members
        .iter()
        .position(|member| member == user_id)
        .ok_or(ServiceError::NotFound(Missing::Member))?;
    if project.owner_id == user_id {
        return Err(ServiceError::CannotRemoveOwner);
    }

    project.team_members.remove(index);
    project.current_team = project.current_team.saturating_sub(1);
    project.updated_at = Utc::now();
    Ok(())
}

pub fn apply_update(project: &mut Project, request: UpdateProjectRequest) -> Result<(), ServiceError> {
    if let Some(team_size) = request.team_size {
        if team_size < project.current_team {
            return Err(ServiceError::validation(vec![FieldError::new(
                "teamSize",
                format!(
                    "teamSize cannot be lower than the current team ({})",
                    project.current_team
                ),
            )]));
        }
        project.team_size = team_size;
    }

    if let Some(name) = request.name {
        project.name = name.trim().to_string();
    }
    if let Some(description) = request.description {
        project.description = description;
    }
    if let Some(status) = request.status {
        project.status = status;
    }
    if let Some(looking_for) = request.looking_for {
        project.looking_for = looking_for;
    }
    if let Some(category) = request.category {
        project.category = category.trim().to_string();
    }
    if let Some(tech) = request.tech {
        project.tech = tech;
    }
    if let Some(needed_roles) = request.needed_roles {
        project.needed_roles = needed_roles;
    }
    if let Some(budget) = request.budget {
        project.budget = budget;
    }
    if let Some(timeline) = request.timeline {
        project.timeline = timeline;
    }
    if let Some(complexity) = request.complexity {
        project.complexity = complexity;
    }
    if let Some(image) = request.image {
        project.image = image;
    }
    if let Some(features) = request.features {
        project.features = features;
    }
    if let Some(requirements) = request.requirements {
        project.requirements = requirements;
    }

    project.updated_at = Utc::now();
    Ok(())
}

fn page_bounds(page: Option<u32>, limit: Option<u32>) -> Result<(u32, u32), ServiceError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let mut problems = Vec::new();
    if page == 0 {
        problems.push(FieldError::new("page", "page must be greater than 0"));
    }
    if limit == 0 || limit > MAX_PAGE_SIZE {
        problems.push(FieldError::new(
            "limit",
            format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }

    if problems.is_empty() {
        Ok((page, limit))
    } else {
        Err(ServiceError::query_validation(problems))
    }
}

fn compare_projects(a: &Project, b: &Project, sort: ProjectSort) -> Ordering {
    let primary = match sort {
        ProjectSort::CreatedAsc => a.created_at.cmp(&b.created_at),
        ProjectSort::CreatedDesc => b.created_at.cmp(&a.created_at),
        ProjectSort::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        ProjectSort::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

// Filters of GET /projects in matching form
#[derive(Debug, Default)]
pub struct ProjectFilter {
    pub terms: Vec<String>,
    pub category: Option<String>,
    pub status: Option<ProjectStatus>,
    pub owner: Option<OwnerFilter>,
    pub needed_roles: Vec<String>,
    pub tech: Vec<String>,
}

impl ProjectFilter {
    pub fn from_query(query: &ProjectListQuery, owner: Option<OwnerFilter>) -> Self {
        Self {
            terms: query
                .q
                .as_deref()
                .map(tokenize)
                .unwrap_or_default(),
            category: query.category.clone(),
            status: query.status,
            owner,
            needed_roles: split_list(query.needed_roles.as_deref()),
            tech: split_list(query.tech.as_deref()),
        }
    }

    // None when the project is filtered out, otherwise its relevance score
    // (always 0 when there is no search text)
    pub fn rank(&self, project: &Project) -> Option<u32> {
        if let Some(category) = &self.category {
            if &project.category != category {
                return None;
            }
        }
        if let Some(status) = self.status {
            if project.status != status {
                return None;
            }
        }
        if let Some(owner) = &self.owner {
            if !owner.matches(project) {
                return None;
            }
        }
        if !overlaps(&self.needed_roles, &project.needed_roles) || !overlaps(&self.tech, &project.tech) {
            return None;
        }
        if self.terms.is_empty() {
            return Some(0);
        }

        let score = relevance(&self.terms, project);
        if score > 0 {
            Some(score)
        } else {
            None
        }
    }
}

// An empty wanted-set does not filter
fn overlaps(wanted: &[String], present: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|tag| present.iter().any(|have| have == tag))
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect()
}

fn relevance(terms: &[String], project: &Project) -> u32 {
    let name = tokenize(&project.name);
    let description = tokenize(&project.description);
    let hits = |words: &[String]| -> u32 {
        terms
            .iter()
            .map(|term| words.iter().filter(|word| *word == term).count() as u32)
            .sum()
    };
    hits(&name) * NAME_WEIGHT + hits(&description) * DESCRIPTION_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, User, UserRole};
    use chrono::Duration;
    use std::sync::Arc;
    use std::thread;

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
                experience: 1,
                location: None,
                portfolio: None,
                created_at: Utc::now(),
            })
            .unwrap()
    }

    fn caller(user: &User) -> Caller {
        Caller::new(user.id.clone(), user.role)
    }

    fn request(name: &str, team_size: u32, tech: &[&str]) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: format!("{} description", name),
            status: None,
            looking_for: String::new(),
            category: "web".to_string(),
            tech: tech.iter().map(|t| t.to_string()).collect(),
            needed_roles: vec!["developer".to_string()],
            team_size,
            budget: String::new(),
            timeline: String::new(),
            complexity: Some(Complexity::Simple),
            image: String::new(),
            features: Vec::new(),
            requirements: Vec::new(),
        }
    }

    #[test]
    fn create_assigns_owner_and_first_seat() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());

        let project = service.create(&caller(&lead), request("Board", 5, &["rust"])).unwrap();

        assert_eq!(project.owner_id, lead.id);
        assert_eq!(project.current_team, 1);
        assert_eq!(project.team_members, vec![lead.id.clone()]);
        assert_eq!(project.status, ProjectStatus::SeekingTeam);
    }

    #[test]
    fn create_rejects_invalid_payload_without_writing() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::Client);
        let service = ProjectService::new(&store, AccessPolicy::default());

        let err = service
            .create(&caller(&lead), request("", 51, &[]))
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(store.all_projects().unwrap().is_empty());
    }

    #[test]
    fn developer_cannot_create_projects() {
        let store = Store::in_memory();
        let dev = user(&store, UserRole::Developer);
        let service = ProjectService::new(&store, AccessPolicy::default());

        let err = service.create(&caller(&dev), request("X", 3, &["go"])).unwrap_err();
        assert_eq!(err.code(), "PROJECT_CREATION_DENIED");
    }

    #[test]
    fn body_problems_are_reported_before_permissions() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let dev = user(&store, UserRole::Developer);
        let service = ProjectService::new(&store, AccessPolicy::default());

        let err = service.create(&caller(&dev), request("", 0, &[])).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let project = service.create(&caller(&lead), request("Board", 3, &["rust"])).unwrap();
        let bad = UpdateProjectRequest {
            name: Some("  ".to_string()),
            ..UpdateProjectRequest::default()
        };
        let err = service.update(&caller(&dev), &project.id, bad).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        // A valid body from a stranger is still refused
        let fine = UpdateProjectRequest {
            name: Some("Mine now".to_string()),
            ..UpdateProjectRequest::default()
        };
        let err = service.update(&caller(&dev), &project.id, fine).unwrap_err();
        assert_eq!(err.code(), "PROJECT_ACCESS_DENIED");
    }

    #[test]
    fn add_then_remove_member_keeps_counts_in_step() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let dev = user(&store, UserRole::Developer);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Board", 5, &["rust"])).unwrap();

        let grown = service.add_member(&caller(&lead), &project.id, &dev.id).unwrap();
        assert_eq!(grown.current_team, 2);
        assert_eq!(grown.team_members.len(), 2);

        let again = service.add_member(&caller(&lead), &project.id, &dev.id).unwrap_err();
        assert_eq!(again.code(), "USER_ALREADY_MEMBER");
        assert_eq!(store.find_project(&project.id).unwrap().unwrap().current_team, 2);

        let shrunk = service.remove_member(&caller(&lead), &project.id, &dev.id).unwrap();
        assert_eq!(shrunk.current_team, 1);
        assert_eq!(shrunk.team_members, vec![lead.id.clone()]);

        let missing = service.remove_member(&caller(&lead), &project.id, &dev.id).unwrap_err();
        assert_eq!(missing.code(), "USER_NOT_MEMBER");
    }

    #[test]
    fn full_team_rejects_new_members() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let dev = user(&store, UserRole::Developer);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Solo", 1, &["rust"])).unwrap();

        let err = service.add_member(&caller(&lead), &project.id, &dev.id).unwrap_err();
        assert_eq!(err.code(), "TEAM_SIZE_EXCEEDED");
        let stored = store.find_project(&project.id).unwrap().unwrap();
        assert_eq!(stored.current_team, 1);
        assert_eq!(stored.team_members.len(), 1);
    }

    #[test]
    fn owner_cannot_be_removed() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Board", 3, &["rust"])).unwrap();

        let err = service.remove_member(&caller(&lead), &project.id, &lead.id).unwrap_err();
        assert_eq!(err.code(), "CANNOT_REMOVE_OWNER");
        let stored = store.find_project(&project.id).unwrap().unwrap();
        assert_eq!(stored.team_members, vec![lead.id.clone()]);
        assert_eq!(stored.updated_at, project.updated_at);
    }

    #[test]
    fn adding_unknown_user_fails() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Board", 3, &["rust"])).unwrap();

        let err = service
            .add_member(&caller(&lead), &project.id, &Uuid::new_v4().to_string())
            .unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[test]
    fn stranger_cannot_touch_the_team() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let other = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Board", 3, &["rust"])).unwrap();

        let err = service.add_member(&caller(&other), &project.id, &other.id).unwrap_err();
        assert_eq!(err.code(), "PROJECT_ACCESS_DENIED");
        assert_eq!(store.find_project(&project.id).unwrap().unwrap().current_team, 1);
    }

    #[test]
    fn concurrent_adds_never_overflow_capacity() {
        let store = Arc::new(Store::in_memory());
        let lead = user(&store, UserRole::TeamLead);
        let candidates: Vec<User> = (0..16).map(|_| user(&store, UserRole::Developer)).collect();
        let project = ProjectService::new(&store, AccessPolicy::default())
            .create(&caller(&lead), request("Race", 4, &["rust"]))
            .unwrap();

        let handles: Vec<_> = candidates
            .into_iter()
            .map(|candidate| {
                let store = Arc::clone(&store);
                let lead = caller(&lead);
                let project_id = project.id.clone();
                thread::spawn(move || {
                    ProjectService::new(&store, AccessPolicy::default())
                        .add_member(&lead, &project_id, &candidate.id)
                        .is_ok()
                })
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        let stored = store.find_project(&project.id).unwrap().unwrap();
        assert_eq!(admitted, 3);
        assert_eq!(stored.current_team, 4);
        assert_eq!(stored.team_members.len(), 4);
        assert!(stored.current_team <= stored.team_size);
    }

    #[test]
    fn update_ignores_protected_fields_and_guards_capacity() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let dev = user(&store, UserRole::Developer);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let project = service.create(&caller(&lead), request("Board", 3, &["rust"])).unwrap();
        service.add_member(&caller(&lead), &project.id, &dev.id).unwrap();

        let body = serde_json::json!({
            "name": "Renamed",
            "status": "paused",
            "ownerId": dev.id,
            "currentTeam": 9,
            "teamMembers": [],
            "createdAt": "2001-01-01T00:00:00Z"
        });
        let update: UpdateProjectRequest = serde_json::from_value(body).unwrap();
        let updated = service.update(&caller(&lead), &project.id, update).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, ProjectStatus::Paused);
        assert_eq!(updated.owner_id, lead.id);
        assert_eq!(updated.current_team, 2);
        assert_eq!(updated.team_members.len(), 2);
        assert_eq!(updated.created_at, project.created_at);

        let shrink = UpdateProjectRequest {
            team_size: Some(1),
            ..UpdateProjectRequest::default()
        };
        let err = service.update(&caller(&lead), &project.id, shrink).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(store.find_project(&project.id).unwrap().unwrap().team_size, 3);
    }

    #[test]
    fn list_filters_by_tech_and_paginates() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());
        for i in 0..25 {
            let tech: &[&str] = match i % 3 {
                0 => &["react"],
                1 => &["go", "postgres"],
                _ => &["python"],
            };
            service
                .create(&caller(&lead), request(&format!("P{:02}", i), 3, tech))
                .unwrap();
        }

        let query = ProjectListQuery {
            tech: Some("react,go".to_string()),
            page: Some(2),
            limit: Some(10),
            ..ProjectListQuery::default()
        };
        let page = service.list(&query).unwrap();

        // 9 react + 8 go projects
        assert_eq!(page.pagination.total, 17);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.projects.len(), 7);
        for view in &page.projects {
            assert!(view.project.tech.iter().any(|t| t == "react" || t == "go"));
        }
    }

    #[test]
    fn list_rejects_oversized_pages() {
        let store = Store::in_memory();
        let service = ProjectService::new(&store, AccessPolicy::default());
        let query = ProjectListQuery {
            limit: Some(101),
            ..ProjectListQuery::default()
        };
        assert_eq!(service.list(&query).unwrap_err().code(), "QUERY_VALIDATION_ERROR");
    }

    #[test]
    fn search_ranks_name_hits_above_description_hits() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());

        let mut in_description = request("Tracker", 3, &["rust"]);
        in_description.description = "a marketplace for teams".to_string();
        service.create(&caller(&lead), in_description).unwrap();
        service
            .create(&caller(&lead), request("Marketplace", 3, &["rust"]))
            .unwrap();
        service.create(&caller(&lead), request("Unrelated", 3, &["rust"])).unwrap();

        let query = ProjectListQuery {
            q: Some("marketplace".to_string()),
            ..ProjectListQuery::default()
        };
        let page = service.list(&query).unwrap();
        let names: Vec<&str> = page.projects.iter().map(|v| v.project.name.as_str()).collect();
        assert_eq!(names, vec!["Marketplace", "Tracker"]);
    }

    #[test]
    fn default_order_is_newest_first() {
        let store = Store::in_memory();
        let lead = user(&store, UserRole::TeamLead);
        let service = ProjectService::new(&store, AccessPolicy::default());
        let older = service.create(&caller(&lead), request("Older", 3, &["rust"])).unwrap();
        store
            .update_project_with(&older.id, |p| {
                p.created_at = p.created_at - Duration::days(1);
                Ok(())
            })
            .unwrap();
        service.create(&caller(&lead), request("Newer", 3, &["rust"])).unwrap();

        let page = service.list(&ProjectListQuery::default()).unwrap();
        assert_eq!(page.projects[0].project.name, "Newer");
        assert_eq!(page.projects[0].owner.as_ref().unwrap().id, lead.id);
    }

    #[test]
    fn list_by_owner_matches_legacy_and_reference_forms() {
        let store = Store::in_memory();
        let mut lead = user(&store, UserRole::TeamLead);
        lead = store
            .update_user_with(&lead.id, |u| {
                u.legacy_id = Some(7);
                Ok(())
            })
            .unwrap();
        let service = ProjectService::new(&store, AccessPolicy::default());

        // one project created after migration, one imported with only the old id intact
        service.create(&caller(&lead), request("Fresh", 3, &["rust"])).unwrap();
        let imported = service.create(&caller(&lead), request("Imported", 3, &["rust"])).unwrap();
        store
            .update_project_with(&imported.id, |p| {
                p.owner_id = "pre-migration".to_string();
                p.legacy_owner_id = Some(7);
                Ok(())
            })
            .unwrap();

        let by_reference = service.list_by_owner(&OwnerKey::Reference(lead.id.clone())).unwrap();
        let by_legacy = service.list_by_owner(&OwnerKey::Legacy(7)).unwrap();
        assert_eq!(by_reference.len(), 2);
        assert_eq!(by_legacy.len(), 2);
    }
}
