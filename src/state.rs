// src/state.rs
use crate::config::Config;
use crate::services::access::AccessPolicy;
use crate::storage::Store;

// Shared application state handed to every handler through `web::Data`
pub struct AppState {
    pub store: Store,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }

    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy {
            admin_override: self.config.admin_override,
        }
    }
}
