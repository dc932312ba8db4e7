//! Hierarchical task codes.
//!
//! A code is a sequence of unsigned integer segments joined by `_`, e.g.
//! `0_1_2`. Segment sequences define the activity tree: `0_1` is the parent
//! of `0_1_2`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskCode(String);

impl TaskCode {
    /// Validate and wrap a code string.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let well_formed = !code.is_empty()
            && code
                .split(SEPARATOR)
                .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(ValidationError::invalid(
                "code",
                format!("'{code}' is not a sequence of integers joined by '{SEPARATOR}'"),
            ));
        }
        Ok(Self(code))
    }

    /// Code of gap-filled days unless configured otherwise.
    pub fn default_fill() -> Self {
        Self("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Textual prefix match with no segment boundary: `1` matches `12`.
    pub fn prefix_matches(&self, other: &TaskCode) -> bool {
        other.0.starts_with(&self.0)
    }

    /// `self` is a proper ancestor of `other` at a segment boundary.
    pub fn is_ancestor_of(&self, other: &TaskCode) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(SEPARATOR)
    }

    /// Codes of every proper ancestor, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.0
            .char_indices()
            .rev()
            .filter(|&(_, c)| c == SEPARATOR)
            .map(|(i, _)| &self.0[..i])
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TaskCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskCode> for String {
    fn from(code: TaskCode) -> Self {
        code.0
    }
}

impl AsRef<str> for TaskCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
