//! Directory-backed template store.
//!
//! Serves template files straight from a directory tree. Template ids are
//! root-relative paths with `/` separators:
//!
//! ```text
//! templates/
//! ├── broker/
//! │   ├── broker.yml
//! │   └── broker.md
//! └── database/
//!     └── cassandra.yml
//! ```
//!
//! The id `broker/broker.yml` resolves to `templates/broker/broker.yml`.
//! Files are read lazily on `get`, so edits on disk are picked up without
//! restarting.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use modwright_core::{
    application::ports::{TemplateStore, TemplateText},
    domain::TemplateId,
    error::ModwrightResult,
};

/// Template store reading from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore {
    root: PathBuf,
}

impl DirectoryTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a template id to its on-disk path, rejecting ids that would
    /// escape the root.
    fn resolve(&self, id: &TemplateId) -> Option<PathBuf> {
        let relative = Path::new(id.as_str());
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TemplateStore for DirectoryTemplateStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn get(&self, id: &TemplateId) -> ModwrightResult<TemplateText> {
        let Some(path) = self.resolve(id) else {
            return Err(modwright_core::application::ApplicationError::TemplateNotFound {
                id: id.as_str().to_string(),
            }
            .into());
        };

        if !path.is_file() {
            return Err(modwright_core::application::ApplicationError::TemplateNotFound {
                id: id.as_str().to_string(),
            }
            .into());
        }

        debug!(path = %path.display(), "loading template");
        let body = std::fs::read_to_string(&path).map_err(|e| {
            modwright_core::application::ApplicationError::Filesystem {
                path,
                reason: format!("Failed to read template: {}", e),
            }
        })?;
        Ok(TemplateText::new(body))
    }

    fn contains(&self, id: &TemplateId) -> bool {
        self.resolve(id).is_some_and(|path| path.is_file())
    }

    fn list(&self) -> ModwrightResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let id = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DirectoryTemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }
        let store = DirectoryTemplateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn get_reads_template_from_disk() {
        let (_dir, store) = store_with(&[("broker/broker.yml", "image: {{brokerImage}}\n")]);

        let id = TemplateId::new("broker/broker.yml");
        assert!(store.contains(&id));
        let template = store.get(&id).unwrap();
        assert_eq!(template.body, "image: {{brokerImage}}\n");
        assert_eq!(template.variables, vec!["brokerImage"]);
    }

    #[test]
    fn list_returns_sorted_relative_ids() {
        let (_dir, store) = store_with(&[("b/two.yml", "2"), ("a/one.yml", "1")]);
        assert_eq!(store.list().unwrap(), vec!["a/one.yml", "b/two.yml"]);
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let (_dir, store) = store_with(&[("a/one.yml", "1")]);
        assert!(!store.contains(&TemplateId::new("../etc/passwd")));
        assert!(store.get(&TemplateId::new("../etc/passwd")).is_err());
    }
}
