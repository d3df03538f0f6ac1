//! Infrastructure adapters for Modwright.
//!
//! This crate implements the ports defined in
//! `modwright-core::application::ports`. It contains all external
//! dependencies and I/O operations, plus the module factories that produce
//! ready-made descriptors for common infrastructure concerns.

pub mod builtin_templates;
pub mod factories;
pub mod filesystem;
pub mod registry;
pub mod template_store;

// Re-export commonly used adapters
pub use factories::{BrokerModuleFactory, DatabaseModuleFactory, ModuleProperties};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use registry::StaticVersionRegistry;
pub use template_store::{DirectoryTemplateStore, InMemoryTemplateStore};
