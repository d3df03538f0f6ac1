//! Built-in module factories.
//!
//! A factory turns user-facing properties plus the curated version registry
//! into a ready-to-apply [`ModuleDescriptor`]. Factories own no I/O; they
//! only build descriptors, which the applier then executes against a tree.

mod broker;
mod database;

pub use broker::BrokerModuleFactory;
pub use database::DatabaseModuleFactory;

/// User-facing properties shared by all module factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProperties {
    project_name: String,
}

impl ModuleProperties {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}
