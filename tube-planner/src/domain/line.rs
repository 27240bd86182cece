//! Line names.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A named service on the network, e.g. "Victoria".
///
/// Lines are cloned into every extended vertex and cache key, so the name is
/// reference counted. Equality, ordering and hashing follow the name, and a
/// `Line` can be looked up in maps by `&str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Line(Arc<str>);

impl Line {
    /// Create a line from its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the line name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Line {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Line {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Line {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<Line> for String {
    fn from(line: Line) -> Self {
        line.0.to_string()
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({})", self.as_str())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
