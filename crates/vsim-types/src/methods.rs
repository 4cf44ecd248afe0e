//! Request and response shapes consumed and produced by the simulator core.
//!
//! These mirror the subset of the management protocol's generated schema
//! that the core actually reads from or writes to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::EntityReference;

/// Criteria for a datastore browser search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Glob patterns matched against file names. An entry matches when any
    /// pattern matches; an empty list matches nothing.
    pub match_pattern: Vec<String>,
}

impl SearchSpec {
    /// Creates a spec matching any of `patterns`.
    #[must_use]
    pub fn matching<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            match_pattern: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// `SearchDatastore_Task` request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchDatastoreRequest {
    /// Folder to search: datastore-relative, or bracket-qualified.
    pub datastore_path: String,
    /// Match criteria.
    pub search_spec: SearchSpec,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path relative to the datastore root, `/`-separated.
    pub path: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Last modification time, when the backing store reports one.
    pub modification: Option<DateTime<Utc>>,
}

/// Result value of a completed datastore search task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDatastoreBrowserSearchResults {
    /// The searched datastore.
    pub datastore: EntityReference,
    /// The folder path exactly as requested.
    pub folder_path: String,
    /// Matching entries, in traversal order.
    pub file: Vec<FileInfo>,
}
