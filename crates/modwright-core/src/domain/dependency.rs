//! Declared library dependencies and the identity-keyed merger.
//!
//! Dependencies live in the target tree's `dependencies.toml`: a `[versions]`
//! alias table pinned by the host project plus `[[dependency]]` entries. The
//! merger deduplicates by (group, artifact, classifier), keeps ordering
//! stable, and resolves version collisions last-write-wins while surfacing an
//! advisory so callers can render a diagnostic.
//!
//! This is not a package manager: nothing transitive is resolved, only the
//! explicitly declared entries are merged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scope a dependency is declared for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Main,
    Test,
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// One declared dependency.
///
/// `version` and `version_alias` are mutually exclusive in practice: an alias
/// points into the host document's `[versions]` table, an exact version is
/// carried inline. Entries with neither inherit whatever the build tooling
/// defaults to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub group: String,
    pub artifact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        default,
        rename = "version-alias",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_alias: Option<String>,
    #[serde(default)]
    pub scope: DependencyScope,
}

impl DependencyEntry {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            classifier: None,
            version: None,
            version_alias: None,
            scope: DependencyScope::Main,
        }
    }

    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Reference a version pinned in the host `[versions]` table.
    pub fn version_alias(mut self, alias: impl Into<String>) -> Self {
        self.version_alias = Some(alias.into());
        self
    }

    pub fn test_scope(mut self) -> Self {
        self.scope = DependencyScope::Test;
        self
    }

    /// Identity key for deduplication: (group, artifact, classifier).
    pub fn key(&self) -> DependencyKey<'_> {
        DependencyKey {
            group: &self.group,
            artifact: &self.artifact,
            classifier: self.classifier.as_deref(),
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// Borrowed identity key of a [`DependencyEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyKey<'a> {
    pub group: &'a str,
    pub artifact: &'a str,
    pub classifier: Option<&'a str>,
}

/// A merge conflict resolved by last-write-wins, surfaced for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub group: String,
    pub artifact: String,
    pub kept: String,
    pub replaced: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: version '{}' replaced '{}' (last write wins)",
            self.group, self.artifact, self.kept, self.replaced
        )
    }
}

/// The parsed `dependencies.toml` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyDocument {
    /// Version aliases pinned by the host project.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, String>,

    /// Declared entries, in declaration order.
    #[serde(default, rename = "dependency", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEntry>,
}

impl DependencyDocument {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn serialize(&self) -> String {
        toml::to_string(self).expect("dependency document serializes to TOML")
    }

    /// Merge new entries into the document.
    ///
    /// Rules (per collision on identity key + scope):
    /// - identical entry: no-op (idempotent re-apply)
    /// - existing alias pinned in `[versions]`: the pin wins, entry unchanged
    /// - new entry declares no version or alias: entry unchanged (an
    ///   unversioned redeclaration carries nothing that could win)
    /// - differing versions otherwise: the new version wins and an advisory
    ///   records the silent override
    ///
    /// Same identity with a *different* scope is not a collision — main and
    /// test declarations coexist as separate entries. Existing entries keep
    /// their relative order; genuinely new entries append in declaration
    /// order.
    pub fn merge(&mut self, entries: &[DependencyEntry]) -> Vec<Advisory> {
        let mut advisories = Vec::new();

        for entry in entries {
            match self
                .dependencies
                .iter_mut()
                .find(|existing| existing.key() == entry.key() && existing.scope == entry.scope)
            {
                None => self.dependencies.push(entry.clone()),
                Some(existing) => {
                    if existing == entry {
                        continue;
                    }
                    let kept = entry.version.clone().or_else(|| entry.version_alias.clone());
                    // An unversioned redeclaration never strips an existing pin.
                    if kept.is_none() {
                        continue;
                    }
                    // A pinned alias on the existing entry always wins.
                    if let Some(alias) = &existing.version_alias {
                        if self.versions.contains_key(alias) {
                            continue;
                        }
                    }
                    let replaced = existing
                        .version
                        .clone()
                        .or_else(|| existing.version_alias.clone());
                    existing.version = entry.version.clone();
                    existing.version_alias = entry.version_alias.clone();
                    if let (Some(kept), Some(replaced)) = (kept, replaced) {
                        if kept != replaced {
                            advisories.push(Advisory {
                                group: entry.group.clone(),
                                artifact: entry.artifact.clone(),
                                kept,
                                replaced,
                            });
                        }
                    }
                }
            }
        }

        advisories
    }
}
