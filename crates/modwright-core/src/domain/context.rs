//! Template variable bindings and the strict renderer.
//!
//! A [`Context`] maps variable names to values for one module application.
//! Rendering is a pure function: same template + same context always yields
//! byte-identical output. Unresolved placeholders are a hard error naming the
//! variable — a template never silently renders an empty string.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Placeholder syntax: `{{variable}}` with optional inner whitespace.
///
/// Variable names are identifiers with `.` allowed for namespacing
/// (e.g. `{{broker.image}}`).
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").expect("placeholder regex is valid")
});

/// A value bound to a context variable.
///
/// Kept deliberately small: strings, booleans, and integers cover everything
/// the operation kinds need. Values render via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    String(String),
    Bool(bool),
    Integer(i64),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Variable bindings for one module application.
///
/// Keys are unique per module invocation; insertion order is irrelevant.
/// Owned by the [`ModuleDescriptor`](crate::domain::ModuleDescriptor) that
/// created it and read-only during rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    variables: HashMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, consuming self for fluent construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Bind a variable in place.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.variables.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Produce a new context where `overrides` shadow this context's values.
    ///
    /// Used by the applier to merge a module context with per-file overrides.
    pub fn merged(&self, overrides: &Context) -> Context {
        let mut variables = self.variables.clone();
        for (k, v) in &overrides.variables {
            variables.insert(k.clone(), v.clone());
        }
        Context { variables }
    }

    /// Render a template by substituting `{{variable}}` placeholders.
    ///
    /// # Errors
    ///
    /// `UnresolvedVariable` naming the first placeholder that has no binding.
    pub fn render(&self, template: &str) -> Result<String, DomainError> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let whole = caps.get(0).expect("capture 0 always present");
            let name = &caps[1];
            let value = self
                .variables
                .get(name)
                .ok_or_else(|| DomainError::UnresolvedVariable {
                    variable: name.to_string(),
                })?;
            out.push_str(&template[last..whole.start()]);
            out.push_str(&value.to_string());
            last = whole.end();
        }
        out.push_str(&template[last..]);

        Ok(out)
    }
}

/// List the distinct placeholder names referenced by a template body.
///
/// Used by template stores to declare expected variables at load time.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_occurrences() {
        let ctx = Context::new().with("name", "demo");
        let out = ctx.render("{{name}} and {{name}} again").unwrap();
        assert_eq!(out, "demo and demo again");
    }

    #[test]
    fn render_is_deterministic() {
        let ctx = Context::new().with("port", 9092i64).with("tls", false);
        let tpl = "servers=localhost:{{port}}\ntls={{tls}}\n";
        assert_eq!(ctx.render(tpl).unwrap(), ctx.render(tpl).unwrap());
    }

    #[test]
    fn render_fails_naming_the_unresolved_variable() {
        let ctx = Context::new().with("known", "x");
        let err = ctx.render("{{known}} {{missing}}").unwrap_err();
        assert_eq!(
            err,
            DomainError::UnresolvedVariable {
                variable: "missing".into()
            }
        );
    }

    #[test]
    fn render_tolerates_whitespace_inside_braces() {
        let ctx = Context::new().with("v", "1");
        assert_eq!(ctx.render("{{ v }}").unwrap(), "1");
    }

    #[test]
    fn render_leaves_non_placeholder_braces_alone() {
        let ctx = Context::new();
        assert_eq!(ctx.render("fn main() { }").unwrap(), "fn main() { }");
    }

    #[test]
    fn merged_overrides_shadow_base() {
        let base = Context::new().with("a", "base").with("b", "base");
        let over = Context::new().with("b", "override");
        let merged = base.merged(&over);
        assert_eq!(merged.get("a"), Some(&ContextValue::from("base")));
        assert_eq!(merged.get("b"), Some(&ContextValue::from("override")));
    }

    #[test]
    fn placeholder_names_are_deduplicated_in_order() {
        let names = placeholder_names("{{b}} {{a}} {{b}}");
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }
}
