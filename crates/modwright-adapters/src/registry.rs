//! Curated version registry adapter.
//!
//! Module factories never hard-code artifact versions or image tags; they ask
//! the registry. `StaticVersionRegistry` keeps the curated set in memory,
//! loaded either from the compiled-in defaults or from a TOML document:
//!
//! ```toml
//! [artifacts]
//! testkit = "1.19.0"
//!
//! [images]
//! cassandra = "4.1.3"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use modwright_core::{
    application::ports::VersionRegistry,
    error::{ModwrightError, ModwrightResult},
};

/// Registry defaults shipped with the binary.
const DEFAULTS: &str = include_str!("versions.toml");

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    artifacts: BTreeMap<String, String>,
    #[serde(default)]
    images: BTreeMap<String, String>,
}

/// In-memory version registry.
#[derive(Debug, Clone, Default)]
pub struct StaticVersionRegistry {
    artifacts: BTreeMap<String, String>,
    images: BTreeMap<String, String>,
}

impl StaticVersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the curated versions shipped in the binary.
    pub fn with_defaults() -> Self {
        Self::from_toml(DEFAULTS).expect("bundled versions.toml is valid")
    }

    /// Parse a registry from a TOML document.
    pub fn from_toml(text: &str) -> ModwrightResult<Self> {
        let doc: RegistryDocument =
            toml::from_str(text).map_err(|e| ModwrightError::Configuration {
                message: format!("invalid version registry: {e}"),
            })?;
        Ok(Self {
            artifacts: doc.artifacts,
            images: doc.images,
        })
    }

    /// Register or override an artifact version.
    pub fn set_artifact(&mut self, slug: impl Into<String>, version: impl Into<String>) {
        self.artifacts.insert(slug.into(), version.into());
    }

    /// Register or override an image tag.
    pub fn set_image(&mut self, image: impl Into<String>, tag: impl Into<String>) {
        self.images.insert(image.into(), tag.into());
    }
}

impl VersionRegistry for StaticVersionRegistry {
    fn artifact_version(&self, slug: &str) -> Option<String> {
        self.artifacts.get(slug).cloned()
    }

    fn image_tag(&self, image: &str) -> Option<String> {
        self.images.get(image).cloned()
    }
}
