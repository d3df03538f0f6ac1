// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for embedding in apply reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Every variant here is detected before any mutation of the target tree, so
/// recovering is always a matter of fixing the module definition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Builder misuse
    // ========================================================================
    #[error("Invalid module state: {reason}")]
    InvalidModuleState { reason: String },

    #[error("Duplicate destination in change set: {destination}")]
    DestinationConflict { destination: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Rendering
    // ========================================================================
    #[error("Unresolved template variable: {variable}")]
    UnresolvedVariable { variable: String },

    // ========================================================================
    // Path and key validation
    // ========================================================================
    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Invalid property key '{key}': {reason}")]
    InvalidPropertyKey { key: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidModuleState { reason } => vec![
                "The module definition is malformed".into(),
                format!("Details: {}", reason),
            ],
            Self::DestinationConflict { destination } => vec![
                format!("Two file placements target '{}'", destination),
                "Each destination must be unique within one module".into(),
            ],
            Self::UnresolvedVariable { variable } => vec![
                format!("The template references '{{{{{}}}}}'", variable),
                "Add the variable to the module context or a per-file override".into(),
            ],
            Self::AbsolutePathNotAllowed { path } => vec![
                format!("'{}' is absolute", path),
                "All module paths are relative to the project root".into(),
            ],
            Self::InvalidPropertyKey { key, reason } => vec![
                format!("Property key '{}' rejected: {}", key, reason),
                "Use dotted keys like 'server.port'".into(),
            ],
            Self::MissingRequiredField { field } => {
                vec![format!("Set '{}' before building the module", field)]
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DestinationConflict { .. } => ErrorCategory::Conflict,
            Self::UnresolvedVariable { .. } => ErrorCategory::NotFound,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}
