// src/storage/dictionaries.rs
use super::Store;
use crate::models::{Category, Dictionaries, RoleDefinition, ServiceError, Technology};

impl Store {
    pub fn roles(&self) -> Result<Vec<RoleDefinition>, ServiceError> {
        let mut roles = self.read()?.dictionaries.roles.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    pub fn technologies(&self) -> Result<Vec<Technology>, ServiceError> {
        let mut technologies = self.read()?.dictionaries.technologies.clone();
        technologies.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(technologies)
    }

    pub fn categories(&self) -> Result<Vec<Category>, ServiceError> {
        let mut categories = self.read()?.dictionaries.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    // Swap all three reference tables at once; entries are keyed by `id`, last one wins
    pub fn replace_dictionaries(&self, mut dictionaries: Dictionaries) -> Result<(), ServiceError> {
        dedup_by_id(&mut dictionaries.roles, |role| role.id.clone());
        dedup_by_id(&mut dictionaries.technologies, |tech| tech.id.clone());
        dedup_by_id(&mut dictionaries.categories, |category| category.id.clone());

        let mut state = self.write()?;
        self.persist_dictionaries(&dictionaries)?;
        state.dictionaries = dictionaries;
        Ok(())
    }
}

fn dedup_by_id<T, K>(entries: &mut Vec<T>, key: K)
where
    K: Fn(&T) -> String,
{
    let mut seen = std::collections::HashSet::new();
    // walk from the back so the last occurrence survives
    entries.reverse();
    entries.retain(|entry| seen.insert(key(entry)));
    entries.reverse();
}
