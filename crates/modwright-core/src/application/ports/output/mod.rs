//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `modwright-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{TemplateId, placeholder_names};
use crate::error::ModwrightResult;

/// Port for target tree I/O.
///
/// Implemented by:
/// - `modwright_adapters::filesystem::LocalFilesystem` (production)
/// - `modwright_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - The applier always resolves paths against the target root before calling
///   in, so implementations see absolute (or root-joined) paths
/// - Permissions are capability-based: the only flag the applier cares about
///   is executable
pub trait ProjectFilesystem: Send + Sync {
    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a file to a string.
    fn read_to_string(&self, path: &Path) -> ModwrightResult<String>;

    /// Write content to a file, truncating any previous content.
    fn write_file(&self, path: &Path, content: &str) -> ModwrightResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ModwrightResult<()>;

    /// Mark a file executable.
    fn set_executable(&self, path: &Path) -> ModwrightResult<()>;
}

/// A template body plus the variables it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText {
    pub body: String,
    /// Distinct placeholder names, in order of first occurrence.
    pub variables: Vec<String>,
}

impl TemplateText {
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let variables = placeholder_names(&body);
        Self { body, variables }
    }
}

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `modwright_adapters::template_store::InMemoryTemplateStore` (built-ins, tests)
/// - `modwright_adapters::template_store::DirectoryTemplateStore` (user templates)
pub trait TemplateStore: Send + Sync {
    /// Get a template by id.
    fn get(&self, id: &TemplateId) -> ModwrightResult<TemplateText>;

    /// Check whether a template exists without loading it.
    fn contains(&self, id: &TemplateId) -> bool;

    /// List all available template ids.
    fn list(&self) -> ModwrightResult<Vec<String>>;
}

/// Port for curated version lookups.
///
/// Module factories consult this when building descriptors so that pinned
/// artifact versions and container image tags live in one place instead of
/// being scattered through factory code.
///
/// Implemented by:
/// - `modwright_adapters::registry::StaticVersionRegistry`
pub trait VersionRegistry: Send + Sync {
    /// The curated version for an artifact slug, if one is registered.
    fn artifact_version(&self, slug: &str) -> Option<String>;

    /// The curated tag for a container image name, if one is registered.
    fn image_tag(&self, image: &str) -> Option<String>;
}
