//! Bracket-qualified datastore paths: `[datastore] relative/path`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed datastore path.
///
/// # Example
///
/// ```
/// use vsim_types::DatastorePath;
///
/// let p: DatastorePath = "[LocalDS_0] vm1/vm1.vmx".parse().unwrap();
/// assert_eq!(p.datastore, "LocalDS_0");
/// assert_eq!(p.path, "vm1/vm1.vmx");
/// assert_eq!(p.to_string(), "[LocalDS_0] vm1/vm1.vmx");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatastorePath {
    /// Datastore name, without brackets.
    pub datastore: String,
    /// Path relative to the datastore root. May be empty.
    pub path: String,
}

impl DatastorePath {
    /// Creates a datastore path from its parts.
    #[must_use]
    pub fn new(datastore: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            datastore: datastore.into(),
            path: path.into(),
        }
    }

    /// Returns a new path with `segments` appended, joined by `/`.
    #[must_use]
    pub fn join<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = self.path.clone();
        for segment in segments {
            let segment = segment.as_ref().trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            if !path.is_empty() && !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(segment);
        }
        Self::new(self.datastore.clone(), path)
    }
}

impl fmt::Display for DatastorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}]", self.datastore)
        } else {
            write!(f, "[{}] {}", self.datastore, self.path)
        }
    }
}

/// The input did not follow the `[name] path` grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed datastore path: {0:?}")]
pub struct DatastorePathError(pub String);

impl FromStr for DatastorePath {
    type Err = DatastorePathError;

    /// Surrounding whitespace is ignored, the name runs up to the first `]`
    /// and the remainder is trimmed to form the relative path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DatastorePathError(s.to_string());

        let rest = s.trim().strip_prefix('[').ok_or_else(malformed)?;
        let (datastore, path) = rest.split_once(']').ok_or_else(malformed)?;

        Ok(Self::new(datastore, path.trim()))
    }
}
