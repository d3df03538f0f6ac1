//! Domain layer - pure business logic, no external dependencies.
//!
//! Everything here is side-effect free: values, validation, merging, and
//! rendering. All I/O lives behind the application ports.

pub mod changeset;
pub mod common;
pub mod context;
pub mod dependency;
pub mod error;
pub mod properties;
pub mod replacement;

pub use changeset::{
    ChangeSet, DocEntry, FileOperation, ModuleBuilder, ModuleDescriptor, Operation, OperationKind,
    PropertyOperation, TemplateId,
};
pub use common::{RelativePath, TargetTree};
pub use context::{Context, ContextValue, placeholder_names};
pub use dependency::{
    Advisory, DependencyDocument, DependencyEntry, DependencyKey, DependencyScope,
};
pub use error::{DomainError, ErrorCategory};
pub use properties::{PropertyDocument, PropertyTarget, PropertyValue};
pub use replacement::{
    Anchor, InsertPosition, Multiplicity, NeedleReplacer, ReplacementOutcome, ReplacementRule,
};
