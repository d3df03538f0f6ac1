//! Structured configuration documents and the property merger.
//!
//! A [`PropertyDocument`] is the parsed form of a `key=value` configuration
//! file, treated as an ordered dotted-path map (a path → value tree with
//! stable ordering) rather than raw text. Setting a key overwrites only the
//! leaf at that path; unrelated keys, their order, and comment lines survive
//! untouched. Re-applying an identical entry leaves the serialized document
//! byte-for-byte unchanged.
//!
//! Main and test documents are separate instances and never cross-pollinate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Which configuration document a property targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyTarget {
    Main,
    Test,
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// A property value: string, boolean, or integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Integer(i64),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// One line of a parsed document.
#[derive(Debug, Clone, PartialEq)]
enum Line {
    /// `key=value` entry, keyed by full dotted path.
    Entry { key: String, value: PropertyValue },
    /// `#`/`!` comment, preserved verbatim.
    Comment(String),
    Blank,
}

/// An ordered dotted-path configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDocument {
    lines: Vec<Line>,
}

impl PropertyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a dotted key path: non-empty, no empty segments.
    pub fn validate_key(key: &str) -> Result<(), DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidPropertyKey {
                key: key.to_string(),
                reason: "key is empty".into(),
            });
        }
        if key.split('.').any(str::is_empty) {
            return Err(DomainError::InvalidPropertyKey {
                key: key.to_string(),
                reason: "empty path segment".into(),
            });
        }
        Ok(())
    }

    /// Parse a document, preserving comments and blank lines in place.
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        for raw in text.lines() {
            let trimmed = raw.trim_end_matches('\r');
            if trimmed.trim().is_empty() {
                lines.push(Line::Blank);
            } else if trimmed.starts_with('#') || trimmed.starts_with('!') {
                lines.push(Line::Comment(trimmed.to_string()));
            } else if let Some((key, value)) = trimmed.split_once('=') {
                lines.push(Line::Entry {
                    key: key.trim().to_string(),
                    value: parse_value(value.trim()),
                });
            } else {
                // A bare line without '=' is kept as a comment so nothing in
                // an existing document is ever dropped.
                lines.push(Line::Comment(trimmed.to_string()));
            }
        }
        Self { lines }
    }

    /// Serialize back to `key=value` text with a trailing newline.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Entry { key, value } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(&value.to_string());
                }
                Line::Comment(text) => out.push_str(text),
                Line::Blank => {}
            }
            out.push('\n');
        }
        out
    }

    /// Set a leaf. An existing key is overwritten in place; a new key
    /// appends at the end of the document.
    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) -> Result<(), DomainError> {
        Self::validate_key(key)?;
        let value = value.into();

        for line in &mut self.lines {
            if let Line::Entry { key: existing, value: slot } = line {
                if existing == key {
                    *slot = value;
                    return Ok(());
                }
            }
        }
        self.lines.push(Line::Entry {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.lines.iter().find_map(|line| match line {
            Line::Entry { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Keys in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Entry { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn parse_value(raw: &str) -> PropertyValue {
    if raw == "true" {
        return PropertyValue::Bool(true);
    }
    if raw == "false" {
        return PropertyValue::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return PropertyValue::Integer(i);
    }
    PropertyValue::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut doc = PropertyDocument::new();
        doc.set("server.port", 8080i64).unwrap();
        assert_eq!(doc.get("server.port"), Some(&PropertyValue::Integer(8080)));
    }

    #[test]
    fn set_overwrites_leaf_in_place_preserving_order() {
        let mut doc = PropertyDocument::new();
        doc.set("a.first", "1").unwrap();
        doc.set("a.second", "2").unwrap();
        doc.set("a.first", "changed").unwrap();

        assert_eq!(doc.keys(), vec!["a.first", "a.second"]);
        assert_eq!(doc.get("a.first"), Some(&PropertyValue::from("changed")));
    }

    #[test]
    fn reapplying_identical_entry_is_byte_identical() {
        let mut doc = PropertyDocument::new();
        doc.set("server.port", 8080i64).unwrap();
        let first = doc.serialize();
        doc.set("server.port", 8080i64).unwrap();
        assert_eq!(doc.serialize(), first);
    }

    #[test]
    fn unrelated_keys_and_comments_survive_a_merge() {
        let text = "# generated configuration\n\nexisting.key=kept\n";
        let mut doc = PropertyDocument::parse(text);
        doc.set("server.jmx", false).unwrap();

        let out = doc.serialize();
        assert_eq!(
            out,
            "# generated configuration\n\nexisting.key=kept\nserver.jmx=false\n"
        );
    }

    #[test]
    fn parse_serialize_is_lossless_for_own_output() {
        let mut doc = PropertyDocument::new();
        doc.set("broker.servers", "localhost:9092").unwrap();
        doc.set("broker.polling.timeout", 10000i64).unwrap();

        let text = doc.serialize();
        assert_eq!(PropertyDocument::parse(&text).serialize(), text);
    }

    #[test]
    fn invalid_keys_are_rejected() {
        let mut doc = PropertyDocument::new();
        assert!(doc.set("", "x").is_err());
        assert!(doc.set("a..b", "x").is_err());
        assert!(doc.set(".a", "x").is_err());
    }

    #[test]
    fn values_parse_into_typed_forms() {
        let doc = PropertyDocument::parse("a=true\nb=42\nc=localhost:9092\n");
        assert_eq!(doc.get("a"), Some(&PropertyValue::Bool(true)));
        assert_eq!(doc.get("b"), Some(&PropertyValue::Integer(42)));
        assert_eq!(doc.get("c"), Some(&PropertyValue::from("localhost:9092")));
    }
}
