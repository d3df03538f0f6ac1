//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! high-level use case of applying a module to a target tree.

pub mod apply_service;

pub use apply_service::{
    ApplyFailure, ApplyResult, ModuleApplier, OperationSummary, SkippedOperation,
    DEPENDENCIES_MANIFEST, MAIN_PROPERTIES, MODULE_LEDGER, TEST_PROPERTIES,
};
