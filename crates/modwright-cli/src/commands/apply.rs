//! Implementation of the `modwright apply` command.
//!
//! Responsibility: translate CLI arguments into a module descriptor, call the
//! core applier, and display results. No business logic lives here.

use std::path::Path;

use tracing::{debug, info, instrument};

use modwright_adapters::{
    BrokerModuleFactory, DatabaseModuleFactory, DirectoryTemplateStore, InMemoryTemplateStore,
    LocalFilesystem, ModuleProperties, StaticVersionRegistry,
};
use modwright_core::{
    application::{ApplyResult, ModuleApplier, TemplateStore, VersionRegistry},
    domain::{ModuleDescriptor, Operation, TargetTree},
};

use crate::{
    cli::{ApplyArgs, ModuleKind},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli as _},
    output::OutputManager,
};

/// Execute the `modwright apply` command.
///
/// Dispatch sequence:
/// 1. Validate the target project tree
/// 2. Resolve the project name (flag, directory name, config default)
/// 3. Build the template store and version registry
/// 4. Build the module descriptor via its factory
/// 5. Early-exit if `--dry-run`
/// 6. Execute the apply and print the report
#[instrument(skip_all, fields(module = %args.module, target = %args.path.display()))]
pub fn execute(args: ApplyArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // 1. The tree must already exist; modules never create projects.
    if !args.path.is_dir() {
        return Err(CliError::ProjectNotFound {
            path: args.path.clone(),
        });
    }

    // 2. Resolve the project name
    let project_name = resolve_project_name(&args, &config);
    debug!(project = %project_name, "Project name resolved");

    // 3. Collaborators
    let store = build_store(&args, &config);
    let registry = build_registry(&args, &config)?;

    // 4. Build the module descriptor
    let properties = ModuleProperties::new(&project_name);
    let module = match args.module {
        ModuleKind::Broker => BrokerModuleFactory::new(registry).build_module(&properties),
        ModuleKind::Cassandra => DatabaseModuleFactory::new(registry).build_module(&properties),
    }
    .with_cli_context(|| "building module")?;

    // 5. Dry run: describe but do not write.
    if args.dry_run {
        show_plan(&module, &output);
        return Ok(());
    }

    // 6. Apply
    output.header(&format!(
        "Applying '{}' to {}...",
        module.name(),
        args.path.display()
    ));
    info!(module = %module.name(), "Apply started");

    let applier = ModuleApplier::new(store, Box::new(LocalFilesystem::new()));
    let report = applier
        .apply(&module, &TargetTree::new(&args.path))
        .with_cli_context(|| "applying module")?;

    show_report(&report, &output)
}

// ── Resolution helpers ────────────────────────────────────────────────────────

/// Project name: `--name` wins, then the target directory's leaf name, then
/// the configured default, then a bland fallback.
fn resolve_project_name(args: &ApplyArgs, config: &AppConfig) -> String {
    if let Some(name) = &args.name {
        return name.clone();
    }
    if let Some(leaf) = directory_leaf(&args.path) {
        return leaf;
    }
    config
        .defaults
        .project_name
        .clone()
        .unwrap_or_else(|| "project".to_string())
}

fn directory_leaf(path: &Path) -> Option<String> {
    // `.` and `..` have no usable file_name; canonicalise first.
    let resolved = path.canonicalize().ok()?;
    resolved
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

fn build_store(args: &ApplyArgs, config: &AppConfig) -> Box<dyn TemplateStore> {
    let dir = args
        .templates
        .clone()
        .or_else(|| config.templates.local_path.clone());

    match dir {
        Some(path) => {
            debug!(path = %path.display(), "Using directory template store");
            Box::new(DirectoryTemplateStore::new(path))
        }
        None => Box::new(InMemoryTemplateStore::with_builtin()),
    }
}

fn build_registry(args: &ApplyArgs, config: &AppConfig) -> CliResult<Box<dyn VersionRegistry>> {
    let file = args
        .versions
        .clone()
        .or_else(|| config.templates.versions_file.clone());

    match file {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_cli_context(|| format!("reading versions file {}", path.display()))?;
            let registry =
                StaticVersionRegistry::from_toml(&text).with_cli_context(|| "parsing versions")?;
            Ok(Box::new(registry))
        }
        None => Ok(Box::new(StaticVersionRegistry::with_defaults())),
    }
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(module: &ModuleDescriptor, out: &OutputManager) {
    out.header(&format!("Dry run: module '{}'", module.name()));
    for (index, op) in module.changeset().operations().iter().enumerate() {
        out.print(&format!("  {index:2}. [{}] {}", op.kind(), describe(op)));
    }
    out.info("No changes were made.");
}

/// One-line description of an operation for the dry-run listing.
fn describe(op: &Operation) -> String {
    match op {
        Operation::FilePlacement(file) => {
            format!("{} -> {}", file.template, file.destination)
        }
        Operation::DependencyAdd(dep) => format!("{}:{}", dep.group, dep.artifact),
        Operation::PropertySet(prop) => format!("{} ({})", prop.key, prop.target),
        Operation::Replacement(rule) => format!("insert into {}", rule.target),
        Operation::DocEntry(doc) => format!("{} -> {}", doc.title, doc.destination()),
        Operation::StartupCommand(cmd) => cmd.clone(),
    }
}

fn show_report(report: &ApplyResult, out: &OutputManager) -> CliResult<()> {
    for op in &report.applied {
        out.print(&format!("  applied  [{}] {}", op.kind, op.detail));
    }
    for op in &report.skipped {
        out.print(&format!("  skipped  [{}] {}", op.kind, op.reason));
    }
    for advisory in &report.advisories {
        out.warning(&advisory.to_string());
    }

    if let Some(failure) = &report.failure {
        out.error(&format!(
            "operation {} failed: {}",
            failure.index, failure.error
        ));
        return Err(CliError::Core(failure.error.clone()));
    }

    if report.is_noop() {
        out.info(&format!("Module '{}' was already applied.", report.module));
    } else {
        out.success(&format!(
            "Module '{}' applied: {} operations, {} already in place.",
            report.module,
            report.applied.len(),
            report.skipped.len()
        ));
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(module: ModuleKind, name: Option<&str>, path: &str) -> ApplyArgs {
        ApplyArgs {
            module,
            path: PathBuf::from(path),
            name: name.map(str::to_string),
            templates: None,
            versions: None,
            dry_run: false,
        }
    }

    #[test]
    fn explicit_name_wins() {
        let a = args(ModuleKind::Broker, Some("shop"), "/tmp/whatever");
        assert_eq!(resolve_project_name(&a, &AppConfig::default()), "shop");
    }

    #[test]
    fn directory_leaf_used_when_name_absent() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-shop");
        std::fs::create_dir(&project).unwrap();

        let a = args(ModuleKind::Broker, None, project.to_str().unwrap());
        assert_eq!(resolve_project_name(&a, &AppConfig::default()), "my-shop");
    }

    #[test]
    fn config_default_used_as_fallback() {
        let mut config = AppConfig::default();
        config.defaults.project_name = Some("fallback".into());

        let a = args(ModuleKind::Broker, None, "/definitely/not/here");
        assert_eq!(resolve_project_name(&a, &config), "fallback");
    }

    #[test]
    fn missing_target_is_project_not_found() {
        let a = args(ModuleKind::Broker, None, "/definitely/not/here");
        let err = execute(
            a,
            AppConfig::default(),
            OutputManager::new(
                &crate::cli::GlobalArgs {
                    verbose: 0,
                    quiet: true,
                    no_color: true,
                    config: None,
                },
                &AppConfig::default(),
            ),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::ProjectNotFound { .. }));
    }
}
