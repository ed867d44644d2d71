//! A canonical, type-safe representation of a path into the world state.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(pub Vec<String>);

impl Path {
    /// Single-segment path, the form used for plain global names.
    pub fn single(name: impl Into<String>) -> Self {
        Path(vec![name.into()])
    }

    /// Splits dotted text (`stats.calls`) into a path. Returns `None` when any
    /// segment is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::runtime::path::Path;
    /// let p = Path::parse("stats.calls").unwrap();
    /// assert_eq!(p.0, vec!["stats".to_string(), "calls".to_string()]);
    /// assert!(Path::parse("stats..calls").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let segments: Vec<String> = text.split('.').map(String::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Path(segments))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
