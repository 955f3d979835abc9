//! Task identifiers
//!
//! ID Format: an ASCII letter, then letters, digits, `_` or `-`, ending in a
//! run of digits (e.g., `T001`, `API-12`, `db_7`).
//!
//! The trailing digits are the numeric suffix used by range expressions:
//! `T001-T005` expands by incrementing the suffix while the prefix and the
//! zero-padding width stay fixed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected a letter prefix followed by digits (e.g. 'T001'), got '{0}'")]
    InvalidTaskId(String),
}

/// Task ID as written in the document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Returns true if `s` is a well-formed task ID token
    pub fn is_valid(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return false;
        }
        s.chars().last().is_some_and(|c| c.is_ascii_digit())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the ID into its prefix and numeric suffix digits
    ///
    /// `T001` -> `("T", "001")`, `API-12` -> `("API-", "12")`
    pub fn split_numeric(&self) -> (&str, &str) {
        let idx = self
            .0
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        self.0.split_at(idx)
    }

    /// Builds an ID from a prefix and a number padded to `width` digits
    pub fn from_parts(prefix: &str, number: u64, width: usize) -> Self {
        Self(format!("{prefix}{number:0width$}"))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(IdError::InvalidTaskId(s.to_string()))
        }
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        for s in ["T001", "API-12", "db_7", "x1"] {
            let id: TaskId = s.parse().unwrap();
            assert_eq!(id.as_str(), s);
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: TaskId = "  T003 ".parse().unwrap();
        assert_eq!(id.as_str(), "T003");
    }

    #[test]
    fn reject_invalid_ids() {
        for s in ["", "001", "T", "Write", "T00a", "T 01", "T001!"] {
            assert!(s.parse::<TaskId>().is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn split_numeric_suffix() {
        let id: TaskId = "T001".parse().unwrap();
        assert_eq!(id.split_numeric(), ("T", "001"));

        let id: TaskId = "API-12".parse().unwrap();
        assert_eq!(id.split_numeric(), ("API-", "12"));

        let id: TaskId = "v2x10".parse().unwrap();
        assert_eq!(id.split_numeric(), ("v2x", "10"));
    }

    #[test]
    fn from_parts_keeps_padding() {
        assert_eq!(TaskId::from_parts("T", 7, 3).as_str(), "T007");
        assert_eq!(TaskId::from_parts("T", 1234, 3).as_str(), "T1234");
    }

    #[test]
    fn serde_roundtrip() {
        let id: TaskId = "T042".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"T042\"");
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<TaskId>("\"nope\"").is_err());
    }
}
