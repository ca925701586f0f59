// src/storage/mod.rs
// Records live in memory behind one RwLock and are mirrored to disk as one JSON
// file per record (<root>/<collection>/<id>.json). Every mutation writes the file
// before touching the in-memory copy. Conditional updates (update_*_with) run
// their check and their write under the same write lock.

use crate::models::{Application, Dictionaries, Project, ServiceError, Session, User};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

mod applications;
mod dictionaries;
mod projects;
mod sessions;
mod users;

pub use projects::OwnerFilter;

pub(crate) const USERS: &str = "users";
pub(crate) const PROJECTS: &str = "projects";
pub(crate) const APPLICATIONS: &str = "applications";
pub(crate) const SESSIONS: &str = "sessions";
const DICTIONARIES_FILE: &str = "dictionaries.json";

#[derive(Default)]
pub(crate) struct Collections {
    pub users: HashMap<String, User>,
    pub projects: HashMap<String, Project>,
    pub applications: HashMap<String, Application>,
    pub sessions: Vec<Session>,
    pub dictionaries: Dictionaries,
}

pub struct Store {
    root: Option<PathBuf>,
    state: RwLock<Collections>,
}

impl Store {
    // Open (or create) a store rooted at `path` and load everything into memory
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let root = path.as_ref().to_path_buf();
        for collection in [USERS, PROJECTS, APPLICATIONS, SESSIONS] {
            fs::create_dir_all(root.join(collection))?;
        }

        let mut collections = Collections {
            users: load_records(&root.join(USERS), |user: &User| user.id.clone())?,
            projects: load_records(&root.join(PROJECTS), |project: &Project| project.id.clone())?,
            applications: load_records(&root.join(APPLICATIONS), |application: &Application| {
                application.id.clone()
            })?,
            ..Collections::default()
        };

        let mut sessions: Vec<Session> =
            load_records(&root.join(SESSIONS), |session: &Session| session.id.clone())?
                .into_values()
                .collect();
        sessions.sort_by_key(|session| session.created_at);
        collections.sessions = sessions;

        let dictionaries_path = root.join(DICTIONARIES_FILE);
        if dictionaries_path.exists() {
            let content = fs::read_to_string(&dictionaries_path)?;
            match serde_json::from_str(&content) {
                Ok(dictionaries) => collections.dictionaries = dictionaries,
                Err(e) => warn!("⚠️ Failed to parse {:?}: {}", dictionaries_path, e),
            }
        }

        info!(
            "📦 Store opened at {:?}: {} users, {} projects, {} applications",
            root,
            collections.users.len(),
            collections.projects.len(),
            collections.applications.len()
        );

        Ok(Self {
            root: Some(root),
            state: RwLock::new(collections),
        })
    }

    // Store without a disk mirror, used by tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            root: None,
            state: RwLock::new(Collections::default()),
        }
    }

    // Drop every record of every collection
    pub fn clear(&self) -> Result<(), ServiceError> {
        let mut state = self.write()?;
        if let Some(root) = &self.root {
            for collection in [USERS, PROJECTS, APPLICATIONS, SESSIONS] {
                let dir = root.join(collection);
                fs::remove_dir_all(&dir)
                    .and_then(|_| fs::create_dir_all(&dir))
                    .map_err(|e| {
                        error!("❌ Failed to clear {:?}: {:?}", dir, e);
                        ServiceError::InternalServerError
                    })?;
            }
            let dictionaries_path = root.join(DICTIONARIES_FILE);
            if dictionaries_path.exists() {
                fs::remove_file(&dictionaries_path).map_err(|e| {
                    error!("❌ Failed to remove {:?}: {:?}", dictionaries_path, e);
                    ServiceError::InternalServerError
                })?;
            }
        }
        *state = Collections::default();
        info!("🧹 Store cleared");
        Ok(())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, ServiceError> {
        self.state.read().map_err(|e| {
            error!("❌ Store lock poisoned: {}", e);
            ServiceError::InternalServerError
        })
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, ServiceError> {
        self.state.write().map_err(|e| {
            error!("❌ Store lock poisoned: {}", e);
            ServiceError::InternalServerError
        })
    }

    pub(crate) fn persist<T: Serialize>(&self, collection: &str, id: &str, record: &T) -> Result<(), ServiceError> {
        let root = match &self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        let path = root.join(collection).join(format!("{}.json", id));
        let json = serde_json::to_string_pretty(record).map_err(|e| {
            error!("❌ Failed to serialize {} record {}: {:?}", collection, id, e);
            ServiceError::InternalServerError
        })?;
        write_replacing(&path, json)?;
        debug!("💾 Saved {}/{}", collection, id);
        Ok(())
    }

    pub(crate) fn unpersist(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        let root = match &self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        let path = root.join(collection).join(format!("{}.json", id));
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                error!("❌ Failed to delete {:?}: {:?}", path, e);
                ServiceError::InternalServerError
            })?;
        }
        Ok(())
    }

    pub(crate) fn persist_dictionaries(&self, dictionaries: &Dictionaries) -> Result<(), ServiceError> {
        let root = match &self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        let json = serde_json::to_string_pretty(dictionaries).map_err(|e| {
            error!("❌ Failed to serialize dictionaries: {:?}", e);
            ServiceError::InternalServerError
        })?;
        write_replacing(&root.join(DICTIONARIES_FILE), json)
    }
}

// Write next to the target and rename over it, so a crash mid-write leaves the
// previous version in place rather than a truncated file
fn write_replacing(path: &Path, json: String) -> Result<(), ServiceError> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, json)
        .and_then(|_| fs::rename(&staging, path))
        .map_err(|e| {
            error!("❌ Failed to write {:?}: {:?}", path, e);
            let _ = fs::remove_file(&staging);
            ServiceError::InternalServerError
        })
}

// Read every `*.json` file in `dir`; unreadable records are skipped with a warning
fn load_records<T, K>(dir: &Path, key: K) -> io::Result<HashMap<String, T>>
where
    T: DeserializeOwned,
    K: Fn(&T) -> String,
{
    let mut records = HashMap::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str::<T>(&content) {
            Ok(record) => {
                records.insert(key(&record), record);
            }
            Err(e) => warn!("⚠️ Skipping unreadable record {:?}: {}", path, e),
        }
    }

    Ok(records)
}
