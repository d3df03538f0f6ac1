//! Module applier - main application orchestrator.
//!
//! Applies one [`ModuleDescriptor`] onto an existing target tree in five
//! ordered phases:
//!
//! 1. file placements (render templates, write destinations)
//! 2. dependency merges into `dependencies.toml`
//! 3. property merges, main document then test document
//! 4. anchored replacements
//! 5. documentation pages and startup commands in the `MODULES.md` ledger
//!
//! Preflight runs before any mutation: the target root must exist, every
//! referenced template must resolve, and every placement must render. A
//! preflight failure returns `Err` with the tree untouched. A failure after
//! mutation starts is reported inside [`ApplyResult`] with the declaration
//! index of the failing operation; earlier phases are not rolled back, and
//! because every operation is idempotent the fixed module can simply be
//! re-applied.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ProjectFilesystem, TemplateStore},
    },
    domain::{
        Advisory, DependencyDocument, ModuleDescriptor, NeedleReplacer, OperationKind,
        PropertyDocument, PropertyTarget, RelativePath, ReplacementOutcome, TargetTree,
    },
    error::{ModwrightError, ModwrightResult},
};

/// Dependency manifest location inside the target tree.
pub const DEPENDENCIES_MANIFEST: &str = "dependencies.toml";
/// Main configuration document location.
pub const MAIN_PROPERTIES: &str = "config/application.properties";
/// Test configuration document location.
pub const TEST_PROPERTIES: &str = "config/application-test.properties";
/// Project ledger listing applied documentation and startup commands.
pub const MODULE_LEDGER: &str = "MODULES.md";

const LEDGER_HEADER: &str = "# Modules\n";

// ----------------------------------------------------------------------------
// Apply report
// ----------------------------------------------------------------------------

/// One operation that mutated the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSummary {
    /// Declaration index within the module's change set.
    pub index: usize,
    pub kind: OperationKind,
    pub detail: String,
}

/// One operation that was a no-op on this tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedOperation {
    pub index: usize,
    pub kind: OperationKind,
    pub reason: String,
}

/// The first operation that failed after mutation started.
#[derive(Debug, Clone)]
pub struct ApplyFailure {
    /// Declaration index of the failing operation.
    pub index: usize,
    pub error: ModwrightError,
}

/// Outcome of applying one module.
///
/// `failure == None` means every operation either applied or was already in
/// place. Advisories are informational: the apply succeeded, but something
/// (a version collision) deserves the caller's attention.
#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    pub module: String,
    pub applied: Vec<OperationSummary>,
    pub skipped: Vec<SkippedOperation>,
    pub advisories: Vec<Advisory>,
    pub failure: Option<ApplyFailure>,
}

impl ApplyResult {
    fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// True when nothing mutated the tree: the module was already applied.
    pub fn is_noop(&self) -> bool {
        self.is_success() && self.applied.is_empty()
    }

    fn applied(&mut self, index: usize, kind: OperationKind, detail: impl Into<String>) {
        self.applied.push(OperationSummary {
            index,
            kind,
            detail: detail.into(),
        });
    }

    fn skipped(&mut self, index: usize, kind: OperationKind, reason: impl Into<String>) {
        self.skipped.push(SkippedOperation {
            index,
            kind,
            reason: reason.into(),
        });
    }
}

impl fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} applied, {} skipped, {} advisories",
            self.module,
            self.applied.len(),
            self.skipped.len(),
            self.advisories.len()
        )
    }
}

// ----------------------------------------------------------------------------
// Applier
// ----------------------------------------------------------------------------

type PhaseResult<T> = Result<T, (usize, ModwrightError)>;

/// Main module application service.
///
/// Orchestrates preflight, phase execution, and reporting over the injected
/// template store and filesystem.
pub struct ModuleApplier {
    store: Box<dyn TemplateStore>,
    filesystem: Box<dyn ProjectFilesystem>,
}

impl ModuleApplier {
    pub fn new(store: Box<dyn TemplateStore>, filesystem: Box<dyn ProjectFilesystem>) -> Self {
        Self { store, filesystem }
    }

    /// Apply a module to an existing target tree.
    ///
    /// # Errors
    ///
    /// `Err` only for preflight failures, with the tree untouched: the target
    /// root is missing, a template cannot be resolved, or a placement does
    /// not render. Failures after mutation starts are reported in
    /// [`ApplyResult::failure`].
    #[instrument(skip_all, fields(module = %module.name(), target = %tree))]
    pub fn apply(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
    ) -> ModwrightResult<ApplyResult> {
        info!(operations = module.changeset().len(), "Applying module");

        let rendered = self.preflight(module, tree)?;

        let mut report = ApplyResult::new(module.name());
        if let Err((index, error)) = self.execute(module, tree, &rendered, &mut report) {
            warn!(index, error = %error, "Apply failed mid-stream");
            report.failure = Some(ApplyFailure { index, error });
            return Ok(report);
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            advisories = report.advisories.len(),
            "Module applied"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Preflight
    // -------------------------------------------------------------------------

    /// Check preconditions and render every template, touching nothing.
    ///
    /// Returns rendered content keyed by declaration index, covering file
    /// placements and documentation entries.
    fn preflight(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
    ) -> ModwrightResult<HashMap<usize, String>> {
        if !self.filesystem.exists(tree.root()) {
            return Err(ApplicationError::MissingPrerequisite {
                reason: format!("target tree '{}' does not exist", tree),
            }
            .into());
        }

        for (_, rule) in module.changeset().replacements() {
            if rule.mandatory && !self.filesystem.exists(&tree.resolve(&rule.target)) {
                return Err(ApplicationError::MissingPrerequisite {
                    reason: format!("replacement target '{}' does not exist", rule.target),
                }
                .into());
            }
        }

        for template in module.changeset().referenced_templates() {
            if !self.store.contains(template) {
                return Err(ApplicationError::TemplateNotFound {
                    id: template.as_str().to_string(),
                }
                .into());
            }
        }

        let mut rendered = HashMap::new();
        for (index, file) in module.changeset().file_placements() {
            let template = self.store.get(&file.template)?;
            let context = module.context().merged(&file.overrides);
            rendered.insert(index, context.render(&template.body)?);
        }
        for (index, doc) in module.changeset().doc_entries() {
            let template = self.store.get(&doc.template)?;
            rendered.insert(index, module.context().render(&template.body)?);
        }

        Ok(rendered)
    }

    // -------------------------------------------------------------------------
    // Phases
    // -------------------------------------------------------------------------

    fn execute(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        rendered: &HashMap<usize, String>,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        self.place_files(module, tree, rendered, report)?;
        self.merge_dependencies(module, tree, report)?;
        self.merge_properties(module, tree, PropertyTarget::Main, report)?;
        self.merge_properties(module, tree, PropertyTarget::Test, report)?;
        self.apply_replacements(module, tree, report)?;
        self.record_documentation(module, tree, rendered, report)?;
        self.record_startup_commands(module, tree, report)?;
        Ok(())
    }

    fn place_files(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        rendered: &HashMap<usize, String>,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        for (index, file) in module.changeset().file_placements() {
            let content = &rendered[&index];
            let written = self
                .write_if_changed(tree, &file.destination, content, file.executable)
                .map_err(|e| (index, e))?;
            if written {
                report.applied(index, OperationKind::File, file.destination.as_str());
            } else {
                report.skipped(index, OperationKind::File, "already up to date");
            }
        }
        Ok(())
    }

    fn merge_dependencies(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        let entries: Vec<_> = module.changeset().dependency_adds().collect();
        let Some(&(first_index, _)) = entries.first() else {
            return Ok(());
        };

        let path = tree.resolve(&RelativePath::new(DEPENDENCIES_MANIFEST));
        let mut doc = if self.filesystem.exists(&path) {
            let text = self
                .filesystem
                .read_to_string(&path)
                .map_err(|e| (first_index, e))?;
            DependencyDocument::parse(&text).map_err(|e| {
                (
                    first_index,
                    ApplicationError::ManifestParse {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                    .into(),
                )
            })?
        } else {
            DependencyDocument::default()
        };

        let mut changed = false;
        for (index, entry) in entries {
            let before = doc.clone();
            let advisories = doc.merge(std::slice::from_ref(entry));
            for advisory in &advisories {
                warn!(advisory = %advisory, "Version collision");
            }
            report.advisories.extend(advisories);

            if doc == before {
                report.skipped(index, OperationKind::Dependency, "already declared");
            } else {
                changed = true;
                report.applied(index, OperationKind::Dependency, entry.to_string());
            }
        }

        if changed {
            self.filesystem
                .write_file(&path, &doc.serialize())
                .map_err(|e| (first_index, e))?;
        }
        Ok(())
    }

    fn merge_properties(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        target: PropertyTarget,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        let ops: Vec<_> = module.changeset().property_sets(target).collect();
        let Some(&(first_index, _)) = ops.first() else {
            return Ok(());
        };

        let rel = match target {
            PropertyTarget::Main => RelativePath::new(MAIN_PROPERTIES),
            PropertyTarget::Test => RelativePath::new(TEST_PROPERTIES),
        };
        let path = tree.resolve(&rel);
        let mut doc = if self.filesystem.exists(&path) {
            let text = self
                .filesystem
                .read_to_string(&path)
                .map_err(|e| (first_index, e))?;
            PropertyDocument::parse(&text)
        } else {
            PropertyDocument::new()
        };

        let mut changed = false;
        for (index, op) in ops {
            if doc.get(&op.key) == Some(&op.value) {
                report.skipped(index, OperationKind::Property, "already set");
                continue;
            }
            doc.set(&op.key, op.value.clone())
                .map_err(|e| (index, ModwrightError::from(e)))?;
            changed = true;
            report.applied(
                index,
                OperationKind::Property,
                format!("{}={} ({target})", op.key, op.value),
            );
        }

        if changed {
            if let Some(parent) = path.parent() {
                self.filesystem
                    .create_dir_all(parent)
                    .map_err(|e| (first_index, e))?;
            }
            self.filesystem
                .write_file(&path, &doc.serialize())
                .map_err(|e| (first_index, e))?;
        }
        Ok(())
    }

    fn apply_replacements(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        for (index, rule) in module.changeset().replacements() {
            let path = tree.resolve(&rule.target);

            if !self.filesystem.exists(&path) {
                if rule.mandatory {
                    return Err((
                        index,
                        ApplicationError::MissingPrerequisite {
                            reason: format!(
                                "replacement target '{}' does not exist",
                                rule.target
                            ),
                        }
                        .into(),
                    ));
                }
                report.skipped(index, OperationKind::Replacement, "target file missing");
                continue;
            }

            let text = self
                .filesystem
                .read_to_string(&path)
                .map_err(|e| (index, e))?;
            let (patched, outcome) = NeedleReplacer::apply(&text, rule)
                .map_err(|e| (index, ModwrightError::from(e)))?;

            match outcome {
                ReplacementOutcome::Applied => {
                    self.filesystem
                        .write_file(&path, &patched)
                        .map_err(|e| (index, e))?;
                    report.applied(
                        index,
                        OperationKind::Replacement,
                        format!("{} in {}", rule.anchor.describe(), rule.target),
                    );
                }
                ReplacementOutcome::AlreadyApplied => {
                    report.skipped(index, OperationKind::Replacement, "already applied");
                }
                ReplacementOutcome::NotFound => {
                    if rule.mandatory {
                        return Err((
                            index,
                            ApplicationError::AnchorNotFound {
                                file: rule.target.as_str().to_string(),
                                anchor: rule.anchor.describe().to_string(),
                            }
                            .into(),
                        ));
                    }
                    report.skipped(index, OperationKind::Replacement, "anchor not found");
                }
            }
        }
        Ok(())
    }

    fn record_documentation(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        rendered: &HashMap<usize, String>,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        for (index, doc) in module.changeset().doc_entries() {
            let destination = doc.destination();
            let written = self
                .write_if_changed(tree, &destination, &rendered[&index], false)
                .map_err(|e| (index, e))?;
            let line = format!("- [{}]({})", doc.title, destination.as_str());
            let linked = self.append_ledger_line(tree, &line).map_err(|e| (index, e))?;

            if written || linked {
                report.applied(index, OperationKind::Documentation, destination.as_str());
            } else {
                report.skipped(index, OperationKind::Documentation, "already recorded");
            }
        }
        Ok(())
    }

    fn record_startup_commands(
        &self,
        module: &ModuleDescriptor,
        tree: &TargetTree,
        report: &mut ApplyResult,
    ) -> PhaseResult<()> {
        for (index, command) in module.changeset().startup_commands() {
            let line = format!("- startup: `{command}`");
            let appended = self.append_ledger_line(tree, &line).map_err(|e| (index, e))?;
            if appended {
                report.applied(index, OperationKind::Startup, command);
            } else {
                report.skipped(index, OperationKind::Startup, "already recorded");
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Write a file only when content differs, creating parent directories.
    ///
    /// Returns whether the tree changed. The executable flag converges even
    /// on skip so permissions cannot drift.
    fn write_if_changed(
        &self,
        tree: &TargetTree,
        destination: &RelativePath,
        content: &str,
        executable: bool,
    ) -> ModwrightResult<bool> {
        let path = tree.resolve(destination);

        if self.filesystem.exists(&path) {
            let existing = self.filesystem.read_to_string(&path)?;
            if existing == content {
                if executable {
                    self.filesystem.set_executable(&path)?;
                }
                return Ok(false);
            }
        }

        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&path, content)?;
        if executable {
            self.filesystem.set_executable(&path)?;
        }
        Ok(true)
    }

    /// Append a line to the project ledger unless it is already present.
    fn append_ledger_line(&self, tree: &TargetTree, line: &str) -> ModwrightResult<bool> {
        let path = tree.resolve(&RelativePath::new(MODULE_LEDGER));
        let mut text = if self.filesystem.exists(&path) {
            self.filesystem.read_to_string(&path)?
        } else {
            LEDGER_HEADER.to_string()
        };

        if text.lines().any(|existing| existing == line) {
            return Ok(false);
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(line);
        text.push('\n');
        self.filesystem.write_file(&path, &text)?;
        Ok(true)
    }
}
