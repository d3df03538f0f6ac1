//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating a module application.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A referenced template is absent from the store.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    /// A precondition of the target tree is not met.
    #[error("Missing prerequisite: {reason}")]
    MissingPrerequisite { reason: String },

    /// A mandatory replacement anchor is absent from its target file.
    #[error("Anchor '{anchor}' not found in {file}")]
    AnchorNotFound { file: String, anchor: String },

    /// The dependency manifest in the target tree is not parseable.
    #[error("Cannot parse {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Template store error")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { id } => vec![
                format!("No template named '{}' in the store", id),
                "Check the template id against the store contents".into(),
            ],
            Self::MissingPrerequisite { reason } => vec![
                format!("Precondition not met: {}", reason),
                "Apply the module that provides this prerequisite first".into(),
            ],
            Self::AnchorNotFound { file, anchor } => vec![
                format!("'{}' does not contain '{}'", file, anchor),
                "The file may predate the marker; apply the providing module first".into(),
            ],
            Self::ManifestParse { path, .. } => vec![
                format!("'{}' is not valid TOML", path.display()),
                "Fix the manifest by hand before re-applying".into(),
            ],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } | Self::AnchorNotFound { .. } => ErrorCategory::NotFound,
            Self::MissingPrerequisite { .. } => ErrorCategory::Validation,
            Self::ManifestParse { .. } => ErrorCategory::Configuration,
            Self::Filesystem { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
