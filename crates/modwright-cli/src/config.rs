//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables (`MODWRIGHT_` prefix, `__` separator)
//! 3. Config file (`--config FILE`, or the default location if it exists)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default values for `apply` invocations.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Project name used when neither `--name` nor the directory name yields one.
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory to load templates from instead of the built-ins.
    pub local_path: Option<PathBuf>,
    /// Version registry file overriding the curated defaults.
    pub versions_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults { project_name: None },
            output: OutputConfig { no_color: false },
            templates: TemplateConfig {
                local_path: None,
                versions_file: None,
            },
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self { project_name: None }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { no_color: false }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            local_path: None,
            versions_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// The `config_file` parameter is the path the user passed via `--config`.
    /// When `None`, the default location is used *if it exists*; a missing
    /// default file is not an error, a missing explicit file is.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(config::File::from(path.as_path()));
            }
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    builder = builder.add_source(config::File::from(default_path));
                }
            }
        }

        // MODWRIGHT_OUTPUT__NO_COLOR=true, MODWRIGHT_TEMPLATES__LOCAL_PATH=…
        builder = builder.add_source(
            config::Environment::with_prefix("MODWRIGHT").separator("__"),
        );

        let cfg = builder.build()?.try_deserialize::<AppConfig>()?;

        Ok(cfg)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.modwright.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "modwright", "modwright")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".modwright.toml"))
    }
}
