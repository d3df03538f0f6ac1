//! In-memory template store with built-in templates.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use modwright_core::{
    application::ports::{TemplateStore, TemplateText},
    domain::TemplateId,
    error::ModwrightResult,
};

use crate::builtin_templates;

/// Thread-safe in-memory template store.
#[derive(Clone)]
pub struct InMemoryTemplateStore {
    inner: Arc<RwLock<HashMap<TemplateId, TemplateText>>>,
}

impl InMemoryTemplateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a store seeded with the built-in templates.
    pub fn with_builtin() -> Self {
        let store = Self::new();
        for (id, body) in builtin_templates::all() {
            store.insert(TemplateId::new(id), TemplateText::new(body));
        }
        store
    }

    /// Insert or replace a template.
    pub fn insert(&self, id: TemplateId, template: TemplateText) {
        let mut inner = self.inner.write().unwrap();
        inner.insert(id, template);
    }

    /// Insert a raw template body under an id (testing convenience).
    pub fn insert_body(&self, id: impl Into<TemplateId>, body: &str) {
        self.insert(id.into(), TemplateText::new(body));
    }

    /// Get the number of templates.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn get(&self, id: &TemplateId) -> ModwrightResult<TemplateText> {
        let inner = self
            .inner
            .read()
            .map_err(|_| modwright_core::application::ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            modwright_core::application::ApplicationError::TemplateNotFound {
                id: id.as_str().to_string(),
            }
            .into()
        })
    }

    fn contains(&self, id: &TemplateId) -> bool {
        self.inner
            .read()
            .map(|inner| inner.contains_key(id))
            .unwrap_or(false)
    }

    fn list(&self) -> ModwrightResult<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| modwright_core::application::ApplicationError::StoreLockError)?;

        let mut ids: Vec<String> = inner.keys().map(|id| id.as_str().to_string()).collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_is_a_not_found_error() {
        let store = InMemoryTemplateStore::new();
        assert!(!store.contains(&TemplateId::new("absent")));
        assert!(store.get(&TemplateId::new("absent")).is_err());
    }

    #[test]
    fn inserted_template_declares_its_variables() {
        let store = InMemoryTemplateStore::new();
        store.insert_body("greeting", "hello {{name}} from {{name}} at {{place}}");

        let template = store.get(&TemplateId::new("greeting")).unwrap();
        assert_eq!(template.variables, vec!["name", "place"]);
    }

    #[test]
    fn builtin_store_is_not_empty() {
        let store = InMemoryTemplateStore::with_builtin();
        assert!(!store.is_empty());
    }
}
