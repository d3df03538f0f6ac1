//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "modwright",
    bin_name = "modwright",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f9f1} Idempotent project modules",
    long_about = "Modwright applies declarative modules onto an existing \
                  project tree: rendered files, dependency merges, property \
                  merges, and anchored text insertions. Re-applying a module \
                  is always safe.",
    after_help = "EXAMPLES:\n\
        \x20 modwright apply broker    --path ./my-app\n\
        \x20 modwright apply cassandra --path ./my-app --name shop\n\
        \x20 modwright list\n\
        \x20 modwright completions bash > /usr/share/bash-completion/completions/modwright",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a module to an existing project tree.
    #[command(
        visible_alias = "a",
        about = "Apply a module to a project",
        after_help = "EXAMPLES:\n\
            \x20 modwright apply broker    --path ./my-app\n\
            \x20 modwright apply cassandra --path ./my-app --name shop\n\
            \x20 modwright apply broker    --path ./my-app --dry-run"
    )]
    Apply(ApplyArgs),

    /// List available modules and templates.
    #[command(
        visible_alias = "ls",
        about = "List available modules and templates",
        after_help = "EXAMPLES:\n\
            \x20 modwright list\n\
            \x20 modwright list --templates"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 modwright completions bash > ~/.local/share/bash-completion/completions/modwright\n\
            \x20 modwright completions zsh  > ~/.zfunc/_modwright\n\
            \x20 modwright completions fish > ~/.config/fish/completions/modwright.fish"
    )]
    Completions(CompletionsArgs),
}

// ── apply ─────────────────────────────────────────────────────────────────────

/// Arguments for `modwright apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Module to apply.
    #[arg(value_enum, value_name = "MODULE", help = "Module to apply")]
    pub module: ModuleKind,

    /// Project tree to apply the module to.
    #[arg(
        short = 'p',
        long = "path",
        value_name = "DIR",
        default_value = ".",
        help = "Target project directory"
    )]
    pub path: PathBuf,

    /// Project name used in derived values (topics, keyspaces).
    ///
    /// Defaults to the target directory name.
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Project name")]
    pub name: Option<String>,

    /// Template directory overriding the built-in templates.
    #[arg(
        long = "templates",
        value_name = "DIR",
        help = "Load templates from a directory instead of the built-ins"
    )]
    pub templates: Option<PathBuf>,

    /// Version registry file overriding the curated defaults.
    #[arg(
        long = "versions",
        value_name = "FILE",
        help = "TOML file with artifact versions and image tags"
    )]
    pub versions: Option<PathBuf>,

    /// Show the operations without applying them.
    #[arg(long = "dry-run", help = "Show what would be applied without applying")]
    pub dry_run: bool,
}

/// Modules the CLI can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Message broker (compose file, client dependency, properties).
    Broker,
    /// Cassandra database (compose file, driver, keyspace bootstrap).
    Cassandra,
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Broker => write!(f, "broker"),
            Self::Cassandra => write!(f, "cassandra"),
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `modwright list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Also list the template ids the modules reference.
    #[arg(long = "templates", help = "Include template ids")]
    pub templates: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `modwright completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn module_kind_display() {
        assert_eq!(ModuleKind::Broker.to_string(), "broker");
        assert_eq!(ModuleKind::Cassandra.to_string(), "cassandra");
    }

    #[test]
    fn parse_apply_command() {
        let cli = Cli::parse_from([
            "modwright",
            "apply",
            "broker",
            "--path",
            "./my-app",
            "--name",
            "shop",
        ]);
        if let Commands::Apply(args) = cli.command {
            assert_eq!(args.module, ModuleKind::Broker);
            assert_eq!(args.name.as_deref(), Some("shop"));
        } else {
            panic!("expected Apply command");
        }
    }

    #[test]
    fn apply_path_defaults_to_current_directory() {
        let cli = Cli::parse_from(["modwright", "apply", "cassandra"]);
        if let Commands::Apply(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("."));
        } else {
            panic!("expected Apply command");
        }
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["modwright", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
