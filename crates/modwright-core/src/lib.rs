//! Modwright Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Modwright
//! module applier, following hexagonal (ports and adapters) architecture.
//!
//! A *module* is a named, declarative change set applied onto an existing
//! project tree: template-rendered file placements, dependency manifest
//! merges, configuration property merges, anchored text replacements, and
//! ledger entries. Every operation is idempotent: re-applying a module to a
//! tree it already shaped is a no-op.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         modwright-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │            (ModuleApplier)              │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Store, Filesystem, VersionRegistry)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   modwright-adapters (Infrastructure)   │
//! │  (InMemoryTemplateStore, LocalFs, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Domain Layer (Pure Logic)         │
//! │  (ModuleDescriptor, ChangeSet, Rules)   │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modwright_core::{
//!     application::ModuleApplier,
//!     domain::{DependencyEntry, ModuleDescriptor, TargetTree},
//! };
//!
//! // 1. Build a module descriptor
//! let module = ModuleDescriptor::builder("message-broker")
//!     .context()
//!     .put("brokerServers", "localhost:9092")
//!     .and()
//!     .dependencies()
//!     .add(DependencyEntry::new("io.streams", "broker-client"))
//!     .and()
//!     .main_properties()
//!     .set("broker.servers", "localhost:9092")
//!     .and()
//!     .build()
//!     .unwrap();
//!
//! // 2. Apply it (with injected adapters)
//! let applier = ModuleApplier::new(store, filesystem);
//! let report = applier.apply(&module, &TargetTree::new("./project")).unwrap();
//! assert!(report.is_success());
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplyResult, ModuleApplier,
        ports::{ProjectFilesystem, TemplateStore, TemplateText, VersionRegistry},
    };
    pub use crate::domain::{
        Advisory, ChangeSet, Context, ContextValue, DependencyEntry, ModuleBuilder,
        ModuleDescriptor, PropertyTarget, RelativePath, ReplacementRule, TargetTree, TemplateId,
    };
    pub use crate::error::{ModwrightError, ModwrightResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
