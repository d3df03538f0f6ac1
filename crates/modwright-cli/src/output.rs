//! Output management and formatting.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use crate::cli::global::GlobalArgs;
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    quiet: bool,
    no_color: bool,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Colour only when nobody opted out and stdout is a TTY.
        let no_color =
            args.no_color || config.output.no_color || !io::stdout().is_terminal();

        Self {
            quiet: args.quiet,
            no_color,
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) {
        if self.quiet {
            return;
        }
        println!("{msg}");
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) {
        if self.quiet {
            return;
        }
        if self.no_color {
            println!("\u{2713} {msg}"); // ✓
        } else {
            println!("{} {}", "\u{2713}".green().bold(), msg.green());
        }
    }

    /// Error indicator: `✗ <msg>`.  *Not* suppressed in quiet mode — errors
    /// must always be visible.
    pub fn error(&self, msg: &str) {
        if self.no_color {
            eprintln!("\u{2717} {msg}"); // ✗
        } else {
            eprintln!("{} {}", "\u{2717}".red().bold(), msg.red());
        }
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) {
        if self.quiet {
            return;
        }
        if self.no_color {
            println!("\u{26a0} {msg}"); // ⚠
        } else {
            println!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow());
        }
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        if self.no_color {
            println!("\u{2139} {msg}"); // ℹ
        } else {
            println!("{} {}", "\u{2139}".blue().bold(), msg.blue());
        }
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) {
        if self.quiet {
            return;
        }
        if self.no_color {
            println!("{text}");
        } else {
            println!("{}", text.cyan().bold());
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::AppConfig;

    fn make_manager(quiet: bool, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn no_color_flag_reported() {
        let no_color = make_manager(false, true);
        assert!(!no_color.supports_color());
    }

    #[test]
    fn quiet_flag_reported() {
        assert!(make_manager(true, true).is_quiet());
        assert!(!make_manager(false, true).is_quiet());
    }
}
