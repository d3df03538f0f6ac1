use super::DomainError;
use std::fmt;
use std::path::{Path, PathBuf};

/// A filesystem path addressed relative to the target project root.
///
/// Invariant: never absolute by the time the applier resolves it. The fluent
/// builder accepts arbitrary path strings, so construction is lenient and
/// `ModuleBuilder::build()` rejects absolute paths; use `try_new` where the
/// error is wanted at construction instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Fallible constructor.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_absolute() {
            Err(DomainError::AbsolutePathNotAllowed {
                path: path.display().to_string(),
            })
        } else {
            Ok(Self(path))
        }
    }

    /// Join a segment, maintaining the relative invariant.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        let segment = segment.as_ref();
        if segment.is_absolute() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: segment.display().to_string(),
            });
        }
        Ok(Self(self.0.join(segment)))
    }

    pub fn is_absolute(&self) -> bool {
        self.0.is_absolute()
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The on-disk project directory a module is applied to.
///
/// The tree exists before the applier runs and is mutated in place; the
/// applier never deletes it and never creates it. Snapshot/restore around a
/// failed apply is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTree {
    root: PathBuf,
}

impl TargetTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path against the root.
    pub fn resolve(&self, path: &RelativePath) -> PathBuf {
        self.root.join(path.as_path())
    }
}

impl fmt::Display for TargetTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_rejects_absolute() {
        assert!(RelativePath::try_new("/etc/passwd").is_err());
        assert!(RelativePath::try_new("src/main.rs").is_ok());
    }

    #[test]
    fn lenient_constructor_defers_absoluteness_to_validation() {
        assert!(RelativePath::new("/etc/passwd").is_absolute());
        assert!(!RelativePath::new("src/main.rs").is_absolute());
    }

    #[test]
    fn relative_path_join_rejects_absolute_segment() {
        let base = RelativePath::new("src");
        assert!(base.join("/abs").is_err());
        assert_eq!(base.join("lib.rs").unwrap().as_str(), "src/lib.rs");
    }

    #[test]
    fn target_tree_resolves_relative_paths() {
        let tree = TargetTree::new("/tmp/project");
        let resolved = tree.resolve(&RelativePath::new("config/application.properties"));
        assert_eq!(
            resolved,
            PathBuf::from("/tmp/project/config/application.properties")
        );
    }
}
