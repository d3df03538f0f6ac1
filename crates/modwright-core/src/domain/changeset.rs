//! The module change-set: a typed accumulation of pending operations.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Module Domain                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ModuleDescriptor (Aggregate Root)                          │
//! │  ├── name                                                   │
//! │  ├── Context (Value Object) - template variables            │
//! │  └── ChangeSet (Value Object) - what to apply               │
//! │       └── Vec<Operation>                                    │
//! │            ├── FilePlacement (template → destination)       │
//! │            ├── DependencyAdd (group/artifact/version)       │
//! │            ├── PropertySet (dotted key → value, main/test)  │
//! │            ├── Replacement (anchored idempotent insert)     │
//! │            ├── DocEntry (rendered page + ledger link)       │
//! │            └── StartupCommand (ledger line)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ModuleBuilder (fluent sections, validates at build())      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! Operations form a *closed* enum rather than trait objects: the applier
//! groups them by kind to guarantee merge ordering (files before dependency
//! merges before property merges before replacements before ledger appends),
//! and a closed set makes that grouping total.
//!
//! The builder and its section builders are consuming, so single-use is
//! enforced by ownership — "append after build" is unrepresentable. What
//! remains representable at runtime (empty name, empty change set, malformed
//! rules, duplicate destinations) fails at `build()`, before any I/O exists
//! to corrupt.

use std::collections::HashSet;
use std::fmt;

use crate::domain::common::RelativePath;
use crate::domain::context::{Context, ContextValue};
use crate::domain::dependency::DependencyEntry;
use crate::domain::error::DomainError;
use crate::domain::properties::{PropertyDocument, PropertyTarget, PropertyValue};
use crate::domain::replacement::ReplacementRule;

// ============================================================================
// Template Identity
// ============================================================================

/// Identifier for a template in the template store.
///
/// Opaque to the core; stores address templates by a path-like name such as
/// `broker/broker.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Operations
// ============================================================================

/// A template rendered to a destination in the target tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOperation {
    pub template: TemplateId,
    pub destination: RelativePath,
    /// Per-file variables shadowing the module context during rendering.
    pub overrides: Context,
    pub executable: bool,
}

/// A property written to one of the configuration documents.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOperation {
    pub key: String,
    pub value: PropertyValue,
    pub target: PropertyTarget,
}

/// A documentation page rendered into `docs/` plus a ledger link.
#[derive(Debug, Clone, PartialEq)]
pub struct DocEntry {
    pub title: String,
    pub template: TemplateId,
}

impl DocEntry {
    /// Ledger-stable slug derived from the title.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        slug.trim_end_matches('-').to_string()
    }

    /// Destination of the rendered page.
    pub fn destination(&self) -> RelativePath {
        RelativePath::new(format!("docs/{}.md", self.slug()))
    }
}

/// One pending mutation of the target tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    FilePlacement(FileOperation),
    DependencyAdd(DependencyEntry),
    PropertySet(PropertyOperation),
    Replacement(ReplacementRule),
    DocEntry(DocEntry),
    StartupCommand(String),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::FilePlacement(_) => OperationKind::File,
            Self::DependencyAdd(_) => OperationKind::Dependency,
            Self::PropertySet(_) => OperationKind::Property,
            Self::Replacement(_) => OperationKind::Replacement,
            Self::DocEntry(_) => OperationKind::Documentation,
            Self::StartupCommand(_) => OperationKind::Startup,
        }
    }
}

/// Discriminant of [`Operation`], used in apply reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    File,
    Dependency,
    Property,
    Replacement,
    Documentation,
    Startup,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Dependency => f.write_str("dependency"),
            Self::Property => f.write_str("property"),
            Self::Replacement => f.write_str("replacement"),
            Self::Documentation => f.write_str("documentation"),
            Self::Startup => f.write_str("startup-command"),
        }
    }
}

// ============================================================================
// ChangeSet
// ============================================================================

/// The ordered operations one module requests.
///
/// Declaration order is preserved; the applier derives phase ordering from
/// operation kinds, not from this sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    operations: Vec<Operation>,
}

impl ChangeSet {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operations of one kind with their declaration indices.
    pub fn indexed<'a, T, F>(&'a self, select: F) -> impl Iterator<Item = (usize, &'a T)>
    where
        F: Fn(&'a Operation) -> Option<&'a T> + 'a,
        T: 'a + ?Sized,
    {
        self.operations
            .iter()
            .enumerate()
            .filter_map(move |(i, op)| select(op).map(|t| (i, t)))
    }

    pub fn file_placements(&self) -> impl Iterator<Item = (usize, &FileOperation)> {
        self.indexed(|op| match op {
            Operation::FilePlacement(f) => Some(f),
            _ => None,
        })
    }

    pub fn dependency_adds(&self) -> impl Iterator<Item = (usize, &DependencyEntry)> {
        self.indexed(|op| match op {
            Operation::DependencyAdd(d) => Some(d),
            _ => None,
        })
    }

    pub fn property_sets(&self, target: PropertyTarget) -> impl Iterator<Item = (usize, &PropertyOperation)> {
        self.indexed(move |op| match op {
            Operation::PropertySet(p) if p.target == target => Some(p),
            _ => None,
        })
    }

    pub fn replacements(&self) -> impl Iterator<Item = (usize, &ReplacementRule)> {
        self.indexed(|op| match op {
            Operation::Replacement(r) => Some(r),
            _ => None,
        })
    }

    pub fn doc_entries(&self) -> impl Iterator<Item = (usize, &DocEntry)> {
        self.indexed(|op| match op {
            Operation::DocEntry(d) => Some(d),
            _ => None,
        })
    }

    pub fn startup_commands(&self) -> impl Iterator<Item = (usize, &str)> {
        self.indexed(|op| match op {
            Operation::StartupCommand(c) => Some(c.as_str()),
            _ => None,
        })
    }

    /// Every template the change set references.
    pub fn referenced_templates(&self) -> Vec<&TemplateId> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::FilePlacement(f) => Some(&f.template),
                Operation::DocEntry(d) => Some(&d.template),
                _ => None,
            })
            .collect()
    }
}

// ============================================================================
// ModuleDescriptor
// ============================================================================

/// A named, immutable bundle of project modifications.
///
/// Built once by a module factory, consumed by the applier. Applying the same
/// descriptor twice to the same tree yields a tree identical to applying it
/// once.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    name: String,
    context: Context,
    changeset: ChangeSet,
}

impl ModuleDescriptor {
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn changeset(&self) -> &ChangeSet {
        &self.changeset
    }
}

// ============================================================================
// ModuleBuilder and sections
// ============================================================================

/// Fluent accumulator producing a [`ModuleDescriptor`].
///
/// Sections mirror the shape of a module definition:
///
/// ```rust,ignore
/// let module = ModuleDescriptor::builder("message-broker")
///     .context()
///         .put("brokerImage", "streams/broker:7.5")
///         .and()
///     .dependencies()
///         .add(DependencyEntry::new("io.streams", "broker-client"))
///         .and()
///     .files()
///         .add("broker/broker.yml", "docker/broker.yml")
///         .and()
///     .main_properties()
///         .set("broker.servers", "localhost:9092")
///         .and()
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    context: Context,
    operations: Vec<Operation>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: Context::new(),
            operations: Vec::new(),
        }
    }

    pub fn context(self) -> ContextSection {
        ContextSection { parent: self }
    }

    pub fn files(self) -> FilesSection {
        FilesSection { parent: self }
    }

    pub fn dependencies(self) -> DependenciesSection {
        DependenciesSection { parent: self }
    }

    pub fn main_properties(self) -> PropertiesSection {
        PropertiesSection {
            parent: self,
            target: PropertyTarget::Main,
        }
    }

    pub fn test_properties(self) -> PropertiesSection {
        PropertiesSection {
            parent: self,
            target: PropertyTarget::Test,
        }
    }

    pub fn replacements(self) -> ReplacementsSection {
        ReplacementsSection { parent: self }
    }

    /// Register a documentation page rendered into `docs/` and linked from
    /// the project ledger.
    pub fn documentation(mut self, title: impl Into<String>, template: impl Into<TemplateId>) -> Self {
        self.operations.push(Operation::DocEntry(DocEntry {
            title: title.into(),
            template: template.into(),
        }));
        self
    }

    /// Register a startup command appended to the project ledger.
    pub fn startup_command(mut self, command: impl Into<String>) -> Self {
        self.operations
            .push(Operation::StartupCommand(command.into()));
        self
    }

    /// Finalize into an immutable [`ModuleDescriptor`].
    ///
    /// # Errors
    ///
    /// - `InvalidModuleState` for an empty name, an empty change set, a
    ///   malformed replacement rule, or a documentation title with no
    ///   sluggable characters
    /// - `DestinationConflict` for duplicate destinations within this module
    /// - `AbsolutePathNotAllowed` for an absolute destination or replacement
    ///   target
    /// - `InvalidPropertyKey` for malformed property keys
    pub fn build(self) -> Result<ModuleDescriptor, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidModuleState {
                reason: "module name cannot be empty".into(),
            });
        }
        if self.operations.is_empty() {
            return Err(DomainError::InvalidModuleState {
                reason: format!("module '{}' declares no operations", self.name),
            });
        }

        let mut destinations = HashSet::new();
        for op in &self.operations {
            match op {
                Operation::FilePlacement(file) => {
                    if file.destination.is_absolute() {
                        return Err(DomainError::AbsolutePathNotAllowed {
                            path: file.destination.to_string(),
                        });
                    }
                    if !destinations.insert(file.destination.as_str().to_string()) {
                        return Err(DomainError::DestinationConflict {
                            destination: file.destination.as_str().to_string(),
                        });
                    }
                }
                Operation::DocEntry(doc) => {
                    if doc.slug().is_empty() {
                        return Err(DomainError::InvalidModuleState {
                            reason: format!(
                                "documentation title '{}' has no sluggable characters",
                                doc.title
                            ),
                        });
                    }
                    if !destinations.insert(doc.destination().as_str().to_string()) {
                        return Err(DomainError::DestinationConflict {
                            destination: doc.destination().as_str().to_string(),
                        });
                    }
                }
                Operation::Replacement(rule) => rule.validate()?,
                Operation::PropertySet(prop) => PropertyDocument::validate_key(&prop.key)?,
                Operation::DependencyAdd(_) | Operation::StartupCommand(_) => {}
            }
        }

        Ok(ModuleDescriptor {
            name: self.name,
            context: self.context,
            changeset: ChangeSet {
                operations: self.operations,
            },
        })
    }
}

/// `context()` section: module-level template variables.
#[derive(Debug)]
pub struct ContextSection {
    parent: ModuleBuilder,
}

impl ContextSection {
    pub fn put(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.parent.context.put(key, value);
        self
    }

    pub fn and(self) -> ModuleBuilder {
        self.parent
    }
}

/// `files()` section: template placements.
#[derive(Debug)]
pub struct FilesSection {
    parent: ModuleBuilder,
}

impl FilesSection {
    pub fn add(self, template: impl Into<TemplateId>, destination: impl Into<RelativePath>) -> Self {
        self.push(template, destination, Context::new(), false)
    }

    /// Placement with per-file context overrides.
    pub fn add_with_context(
        self,
        template: impl Into<TemplateId>,
        destination: impl Into<RelativePath>,
        overrides: Context,
    ) -> Self {
        self.push(template, destination, overrides, false)
    }

    /// Placement marked executable (scripts, entry points).
    pub fn add_executable(
        self,
        template: impl Into<TemplateId>,
        destination: impl Into<RelativePath>,
    ) -> Self {
        self.push(template, destination, Context::new(), true)
    }

    fn push(
        mut self,
        template: impl Into<TemplateId>,
        destination: impl Into<RelativePath>,
        overrides: Context,
        executable: bool,
    ) -> Self {
        self.parent
            .operations
            .push(Operation::FilePlacement(FileOperation {
                template: template.into(),
                destination: destination.into(),
                overrides,
                executable,
            }));
        self
    }

    pub fn and(self) -> ModuleBuilder {
        self.parent
    }
}

/// `dependencies()` section.
#[derive(Debug)]
pub struct DependenciesSection {
    parent: ModuleBuilder,
}

impl DependenciesSection {
    pub fn add(mut self, entry: DependencyEntry) -> Self {
        self.parent.operations.push(Operation::DependencyAdd(entry));
        self
    }

    /// Shorthand for an unversioned main-scope entry.
    pub fn add_dependency(self, group: impl Into<String>, artifact: impl Into<String>) -> Self {
        self.add(DependencyEntry::new(group, artifact))
    }

    pub fn and(self) -> ModuleBuilder {
        self.parent
    }
}

/// `main_properties()` / `test_properties()` section.
#[derive(Debug)]
pub struct PropertiesSection {
    parent: ModuleBuilder,
    target: PropertyTarget,
}

impl PropertiesSection {
    pub fn set(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.parent.operations.push(Operation::PropertySet(PropertyOperation {
            key: key.into(),
            value: value.into(),
            target: self.target,
        }));
        self
    }

    pub fn and(self) -> ModuleBuilder {
        self.parent
    }
}

/// `replacements()` section.
#[derive(Debug)]
pub struct ReplacementsSection {
    parent: ModuleBuilder,
}

impl ReplacementsSection {
    pub fn add(mut self, rule: ReplacementRule) -> Self {
        self.parent.operations.push(Operation::Replacement(rule));
        self
    }

    pub fn and(self) -> ModuleBuilder {
        self.parent
    }
}
