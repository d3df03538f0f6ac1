//! Anchored, idempotent text insertion: the needle replacer.
//!
//! Generated files carry sentinel markers (needles) so later modules can
//! insert content at a known point; rules may also anchor on literal text or
//! a regex. Whatever the anchor, applying a rule to an already-patched file
//! must not duplicate the insertion.
//!
//! State machine per rule: `pending → matched → applied` or
//! `pending → not-found → skipped`. The only terminal error is a mandatory
//! rule whose anchor is missing from a file that was never patched — and that
//! decision belongs to the applier, which knows the file path; this module
//! just reports the outcome.

use std::fmt;

use regex::{NoExpand, Regex};

use crate::domain::common::RelativePath;
use crate::domain::error::DomainError;

/// Where an insertion lands relative to a marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// How a rule locates its insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// A sentinel token expected to occur on exactly one line. The marker is
    /// left reusable for later modules unless `single_use` consumes it.
    Marker {
        token: String,
        position: InsertPosition,
        single_use: bool,
    },
    /// Literal text; the match itself is replaced.
    Literal { needle: String },
    /// Regex pattern; the match itself is replaced. The replacement text is
    /// taken literally (no capture-group expansion).
    Regex { pattern: String },
}

impl Anchor {
    /// The human-readable anchor text, for diagnostics.
    pub fn describe(&self) -> &str {
        match self {
            Self::Marker { token, .. } => token,
            Self::Literal { needle } => needle,
            Self::Regex { pattern } => pattern,
        }
    }
}

/// How many occurrences a literal/regex rule consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Multiplicity {
    #[default]
    AtMostOnce,
    EveryOccurrence,
}

/// A declarative text replacement against one file in the target tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementRule {
    pub target: RelativePath,
    pub anchor: Anchor,
    pub text: String,
    pub multiplicity: Multiplicity,
    /// Mandatory rules fail the apply when the anchor is missing from a
    /// never-patched file; optional rules skip instead.
    pub mandatory: bool,
}

impl ReplacementRule {
    fn new(target: impl Into<RelativePath>, anchor: Anchor, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            anchor,
            text: text.into(),
            multiplicity: Multiplicity::AtMostOnce,
            mandatory: false,
        }
    }

    pub fn insert_before_marker(
        target: impl Into<RelativePath>,
        token: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Anchor::Marker {
                token: token.into(),
                position: InsertPosition::Before,
                single_use: false,
            },
            text,
        )
    }

    pub fn insert_after_marker(
        target: impl Into<RelativePath>,
        token: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Anchor::Marker {
                token: token.into(),
                position: InsertPosition::After,
                single_use: false,
            },
            text,
        )
    }

    pub fn replace_text(
        target: impl Into<RelativePath>,
        needle: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Anchor::Literal {
                needle: needle.into(),
            },
            text,
        )
    }

    pub fn replace_regex(
        target: impl Into<RelativePath>,
        pattern: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Anchor::Regex {
                pattern: pattern.into(),
            },
            text,
        )
    }

    /// Fail the apply if the anchor is missing from a never-patched file.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Replace every occurrence instead of the first.
    pub fn every_occurrence(mut self) -> Self {
        self.multiplicity = Multiplicity::EveryOccurrence;
        self
    }

    /// Consume the marker on application instead of leaving it reusable.
    ///
    /// Only meaningful for marker anchors; a no-op otherwise.
    pub fn single_use(mut self) -> Self {
        if let Anchor::Marker { single_use, .. } = &mut self.anchor {
            *single_use = true;
        }
        self
    }

    /// Validate the rule shape. Called at module build time so a malformed
    /// rule never reaches the applier.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.target.is_absolute() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: self.target.to_string(),
            });
        }
        if self.text.is_empty() {
            return Err(DomainError::InvalidModuleState {
                reason: format!("replacement in '{}' has empty text", self.target),
            });
        }
        match &self.anchor {
            Anchor::Marker { token, .. } if token.is_empty() => {
                Err(DomainError::InvalidModuleState {
                    reason: format!("replacement in '{}' has empty marker token", self.target),
                })
            }
            Anchor::Literal { needle } if needle.is_empty() => {
                Err(DomainError::InvalidModuleState {
                    reason: format!("replacement in '{}' has empty needle", self.target),
                })
            }
            Anchor::Regex { pattern } => Regex::new(pattern).map(|_| ()).map_err(|e| {
                DomainError::InvalidModuleState {
                    reason: format!("invalid regex anchor in '{}': {e}", self.target),
                }
            }),
            _ => Ok(()),
        }
    }
}

/// Result of evaluating one rule against file text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementOutcome {
    /// The anchor matched and the text was inserted.
    Applied,
    /// The insertion text is already present; nothing to do.
    AlreadyApplied,
    /// The anchor is absent and the text was never inserted.
    NotFound,
}

impl fmt::Display for ReplacementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::AlreadyApplied => f.write_str("already applied"),
            Self::NotFound => f.write_str("anchor not found"),
        }
    }
}

/// Pure rule evaluator; all file I/O stays in the applier.
pub struct NeedleReplacer;

impl NeedleReplacer {
    /// Apply a rule to file text.
    ///
    /// The already-present check runs first: a file that contains the
    /// insertion text verbatim is treated as patched, which is what makes
    /// literal replacements whose output still contains the needle safe to
    /// re-run.
    pub fn apply(
        text: &str,
        rule: &ReplacementRule,
    ) -> Result<(String, ReplacementOutcome), DomainError> {
        // CRLF files get the check against a normalized view too, so a
        // multi-line insertion (joined with the file's own line endings on
        // the first pass) still registers as present on re-run.
        if text.contains(&rule.text)
            || (text.contains("\r\n") && text.replace("\r\n", "\n").contains(&rule.text))
        {
            return Ok((text.to_string(), ReplacementOutcome::AlreadyApplied));
        }

        match &rule.anchor {
            Anchor::Marker {
                token,
                position,
                single_use,
            } => Ok(insert_at_marker(text, token, *position, *single_use, &rule.text)),
            Anchor::Literal { needle } => {
                if !text.contains(needle.as_str()) {
                    return Ok((text.to_string(), ReplacementOutcome::NotFound));
                }
                let replaced = match rule.multiplicity {
                    Multiplicity::AtMostOnce => text.replacen(needle.as_str(), &rule.text, 1),
                    Multiplicity::EveryOccurrence => text.replace(needle.as_str(), &rule.text),
                };
                Ok((replaced, ReplacementOutcome::Applied))
            }
            Anchor::Regex { pattern } => {
                let re = Regex::new(pattern).map_err(|e| DomainError::InvalidModuleState {
                    reason: format!("invalid regex anchor: {e}"),
                })?;
                if !re.is_match(text) {
                    return Ok((text.to_string(), ReplacementOutcome::NotFound));
                }
                let replaced = match rule.multiplicity {
                    Multiplicity::AtMostOnce => re.replace(text, NoExpand(&rule.text)),
                    Multiplicity::EveryOccurrence => re.replace_all(text, NoExpand(&rule.text)),
                };
                Ok((replaced.into_owned(), ReplacementOutcome::Applied))
            }
        }
    }
}

/// Line-based marker insertion. The insertion text may span multiple lines.
/// The file's line-ending style (LF or CRLF) is preserved.
fn insert_at_marker(
    text: &str,
    token: &str,
    position: InsertPosition,
    single_use: bool,
    insertion: &str,
) -> (String, ReplacementOutcome) {
    let Some(marker_index) = text.lines().position(|line| line.contains(token)) else {
        return (text.to_string(), ReplacementOutcome::NotFound);
    };
    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let mut out: Vec<&str> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if i == marker_index {
            match position {
                InsertPosition::Before => {
                    out.extend(insertion.lines());
                    if !single_use {
                        out.push(line);
                    }
                }
                InsertPosition::After => {
                    if !single_use {
                        out.push(line);
                    }
                    out.extend(insertion.lines());
                }
            }
        } else {
            out.push(line);
        }
    }

    let mut joined = out.join(eol);
    if text.ends_with('\n') {
        joined.push_str(eol);
    }
    (joined, ReplacementOutcome::Applied)
}
