// src/import.rs
// One-shot loader for the flat JSON snapshot the platform started from. Numeric
// ids are remapped to fresh reference ids; records with unresolvable foreign
// keys are skipped and counted.

use crate::models::{
    Application, ApplicationStatus, Category, Complexity, Dictionaries, Project, ProjectStatus,
    RoleDefinition, ServiceError, Technology, User, UserRole, ANONYMOUS_APPLICANT, MAX_TEAM_SIZE,
};
use crate::storage::Store;
use crate::utils::password;
use chrono::Utc;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

// Ids appear both as numbers and as strings in the snapshot
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn key(&self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        }
    }

    fn legacy(&self) -> Option<u64> {
        match self {
            RawId::Number(n) => Some(*n),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

// Numbers that may also arrive as strings ("3", "12 people")
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn as_u32(&self) -> Option<u32> {
        match self {
            RawNumber::Number(n) if *n >= 0.0 => Some(*n as u32),
            RawNumber::Number(_) => None,
            RawNumber::Text(s) => {
                let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            }
        }
    }
}

// Lists that older records stored as a comma separated string
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RawList {
    Items(Vec<String>),
    Joined(String),
}

impl RawList {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            RawList::Items(items) => items,
            RawList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LegacyUser {
    pub id: RawId,
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub avatar: Option<String>,
    pub skills: Option<RawList>,
    pub bio: Option<String>,
    pub experience: Option<RawNumber>,
    pub location: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProject {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    pub looking_for: Option<String>,
    #[serde(default)]
    pub category: String,
    pub tech: Option<RawList>,
    pub needed_roles: Option<RawList>,
    pub team_size: Option<RawNumber>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub complexity: Option<String>,
    pub image: Option<String>,
    pub features: Option<RawList>,
    pub requirements: Option<RawList>,
    pub owner_id: Option<RawId>,
    #[serde(default)]
    pub team_members: Vec<RawId>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LegacyApplication {
    pub project_id: Option<RawId>,
    pub user_id: Option<RawId>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LegacySnapshot {
    pub users: Vec<LegacyUser>,
    pub projects: Vec<LegacyProject>,
    pub applications: Vec<LegacyApplication>,
    pub roles: Vec<RoleDefinition>,
    pub technologies: Vec<Technology>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub users: usize,
    pub projects: usize,
    pub applications: usize,
    pub roles: usize,
    pub technologies: usize,
    pub categories: usize,
    pub skipped_users: usize,
    pub skipped_projects: usize,
    pub skipped_applications: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "👥 Users: {} (skipped {})", self.users, self.skipped_users)?;
        writeln!(f, "🚀 Projects: {} (skipped {})", self.projects, self.skipped_projects)?;
        writeln!(
            f,
            "📝 Applications: {} (skipped {})",
            self.applications, self.skipped_applications
        )?;
        writeln!(f, "📚 Roles: {}", self.roles)?;
        writeln!(f, "💻 Technologies: {}", self.technologies)?;
        write!(f, "📂 Categories: {}", self.categories)
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<LegacySnapshot, ServiceError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        warn!("⚠️ Cannot read snapshot {:?}: {}", path, e);
        ServiceError::InternalServerError
    })?;
    serde_json::from_str(&content).map_err(|e| {
        warn!("⚠️ Snapshot {:?} is not valid JSON: {}", path, e);
        ServiceError::invalid_field("snapshot", &e.to_string())
    })
}

// Replace the whole store content with the snapshot
pub fn run(store: &Store, snapshot: LegacySnapshot, bcrypt_cost: u32) -> Result<ImportReport, ServiceError> {
    let mut report = ImportReport::default();

    store.clear()?;

    report.roles = snapshot.roles.len();
    report.technologies = snapshot.technologies.len();
    report.categories = snapshot.categories.len();
    store.replace_dictionaries(Dictionaries {
        roles: snapshot.roles,
        technologies: snapshot.technologies,
        categories: snapshot.categories,
    })?;

    let users = import_users(store, snapshot.users, bcrypt_cost, &mut report)?;
    let projects = import_projects(store, snapshot.projects, &users, &mut report)?;
    import_applications(store, snapshot.applications, &users, &projects, &mut report)?;

    info!("🎉 Import finished");
    Ok(report)
}

// Returns legacy key -> new user id
fn import_users(
    store: &Store,
    users: Vec<LegacyUser>,
    bcrypt_cost: u32,
    report: &mut ImportReport,
) -> Result<HashMap<String, String>, ServiceError> {
    let mut mapping = HashMap::new();

    for legacy in users {
        let key = legacy.id.key();
        let plaintext = match legacy.password {
            Some(password) if !password.is_empty() => password,
            _ => {
                warn!("⚠️ User {} has no password, assigning a random one", key);
                Uuid::new_v4().to_string()
            }
        };

        let user = User {
            id: Uuid::new_v4().to_string(),
            legacy_id: legacy.id.legacy(),
            name: legacy.name.trim().to_string(),
            email: legacy.email.trim().to_lowercase(),
            password_hash: password::hash_password(&plaintext, bcrypt_cost)?,
            role: parse_label::<UserRole>(legacy.role.as_deref(), "role", &key),
            avatar: legacy.avatar.filter(|avatar| !avatar.is_empty()),
            skills: legacy.skills.map(RawList::into_vec).unwrap_or_default(),
            bio: legacy.bio,
            experience: legacy
                .experience
                .and_then(|experience| experience.as_u32())
                .map_or(0, |years| years.min(50) as u8),
            location: legacy.location,
            portfolio: legacy.portfolio.filter(|portfolio| !portfolio.is_empty()),
            created_at: Utc::now(),
        };

        match store.insert_user(user) {
            Ok(user) => {
                mapping.insert(key, user.id);
                report.users += 1;
            }
            Err(ServiceError::Conflict(_)) => {
                warn!("⚠️ Skipping user {}: email {} is already taken", key, legacy.email);
                report.skipped_users += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(mapping)
}

// Returns legacy key -> new project id
fn import_projects(
    store: &Store,
    projects: Vec<LegacyProject>,
    users: &HashMap<String, String>,
    report: &mut ImportReport,
) -> Result<HashMap<String, String>, ServiceError> {
    let mut mapping = HashMap::new();

    for legacy in projects {
        let key = legacy.id.key();
        let owner_id = match legacy.owner_id.as_ref().and_then(|owner| users.get(&owner.key())) {
            Some(owner_id) => owner_id.clone(),
            None => {
                warn!("⚠️ Skipping project {}: owner not found", legacy.name);
                report.skipped_projects += 1;
                continue;
            }
        };

        let mut team_members = vec![owner_id.clone()];
        for member in &legacy.team_members {
            match users.get(&member.key()) {
                Some(id) if !team_members.contains(id) => team_members.push(id.clone()),
                Some(_) => {}
                None => warn!("⚠️ Project {}: dropping unknown member {}", legacy.name, member.key()),
            }
        }

        let current_team = team_members.len() as u32;
        let declared = legacy
            .team_size
            .as_ref()
            .and_then(RawNumber::as_u32)
            .unwrap_or(1)
            .max(1);
        let team_size = declared.max(current_team);
        if team_size > MAX_TEAM_SIZE {
            warn!(
                "⚠️ Skipping project {}: team size {} is above {}",
                legacy.name, team_size, MAX_TEAM_SIZE
            );
            report.skipped_projects += 1;
            continue;
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: legacy.name.trim().to_string(),
            description: legacy.description,
            status: parse_label::<ProjectStatus>(legacy.status.as_deref(), "status", &key),
            looking_for: legacy.looking_for.unwrap_or_default(),
            category: legacy.category,
            tech: legacy.tech.map(RawList::into_vec).unwrap_or_default(),
            needed_roles: legacy.needed_roles.map(RawList::into_vec).unwrap_or_default(),
            team_size,
            current_team,
            budget: legacy.budget.unwrap_or_default(),
            timeline: legacy.timeline.unwrap_or_default(),
            complexity: parse_label::<Complexity>(legacy.complexity.as_deref(), "complexity", &key),
            image: legacy.image.unwrap_or_default(),
            features: legacy.features.map(RawList::into_vec).unwrap_or_default(),
            requirements: legacy.requirements.map(RawList::into_vec).unwrap_or_default(),
            owner_id,
            legacy_owner_id: legacy.owner_id.as_ref().and_then(RawId::legacy),
            team_members,
            created_at: now,
            updated_at: now,
        };

        let project = store.insert_project(project)?;
        mapping.insert(key, project.id);
        report.projects += 1;
    }

    Ok(mapping)
}

fn import_applications(
    store: &Store,
    applications: Vec<LegacyApplication>,
    users: &HashMap<String, String>,
    projects: &HashMap<String, String>,
    report: &mut ImportReport,
) -> Result<(), ServiceError> {
    for legacy in applications {
        let project_id = match legacy.project_id.as_ref().and_then(|id| projects.get(&id.key())) {
            Some(project_id) => project_id.clone(),
            None => {
                warn!("⚠️ Skipping application: project not found");
                report.skipped_applications += 1;
                continue;
            }
        };

        let application = Application {
            id: Uuid::new_v4().to_string(),
            project_id,
            user_id: legacy.user_id.as_ref().and_then(|id| users.get(&id.key()).cloned()),
            name: legacy
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| ANONYMOUS_APPLICANT.to_string()),
            role: legacy.role.unwrap_or_default(),
            message: legacy.message.unwrap_or_default(),
            status: parse_label::<ApplicationStatus>(legacy.status.as_deref(), "status", "application"),
            created_at: Utc::now(),
        };

        store.insert_application(application)?;
        report.applications += 1;
    }

    Ok(())
}

// Map a free-text label onto one of our enums; unknown labels fall back to the default
fn parse_label<T>(raw: Option<&str>, field: &str, record: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw,
        None => return T::default(),
    };
    serde_json::from_value(Value::String(raw.to_lowercase())).unwrap_or_else(|_| {
        warn!("⚠️ Record {}: unknown {} {:?}, using default", record, field, raw);
        T::default()
    })
}
