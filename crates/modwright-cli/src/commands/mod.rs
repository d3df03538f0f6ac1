//! Command handlers.
//!
//! One module per subcommand; each exposes a single `execute` function that
//! the dispatcher in `main.rs` calls.

pub mod apply;
pub mod completions;
pub mod list;
