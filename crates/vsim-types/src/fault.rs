//! Typed faults.
//!
//! Every failure a client can observe is a [`MethodFault`]. Faults raised
//! inside a task body are attached to the terminal task; faults raised
//! before dispatch (reference resolution, path parsing) are returned
//! directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reference::EntityReference;

/// Coarse classification of a [`MethodFault`], for callers that branch on
/// the category rather than the concrete fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    /// The reference names a kind with no registered constructor.
    UnknownKind,
    /// The referenced entity or datastore does not exist.
    NotFound,
    /// A datastore path is malformed or its backing location is unusable.
    InvalidPath,
    /// The operation is blocked by live dependents.
    ResourceInUse,
    /// A backing resource could not be reached.
    ConfigurationFault,
    /// The target kind does not implement the requested method.
    NotSupported,
    /// Unexpected failure inside the simulator.
    InternalFault,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnknownKind => "UnknownKind",
            Self::NotFound => "NotFound",
            Self::InvalidPath => "InvalidPath",
            Self::ResourceInUse => "ResourceInUse",
            Self::ConfigurationFault => "ConfigurationFault",
            Self::NotSupported => "NotSupported",
            Self::InternalFault => "InternalFault",
        };
        f.write_str(name)
    }
}

/// A typed fault value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MethodFault {
    /// No constructor is registered for the reference's kind.
    #[error("unknown managed type: {kind:?}")]
    UnknownKind {
        /// The unrecognized kind token.
        kind: String,
    },

    /// The referenced entity is not in the inventory.
    #[error("managed object not found: {reference}")]
    ManagedObjectNotFound {
        /// The missing reference.
        reference: EntityReference,
    },

    /// An identifier string could not be decoded into a reference.
    #[error("no managed object matches {input:?}")]
    UnresolvedIdentifier {
        /// The raw identifier.
        input: String,
    },

    /// A datastore path is malformed, or its search root cannot be walked.
    #[error("invalid datastore path: {path:?}")]
    InvalidDatastorePath {
        /// The offending path, as supplied by the caller.
        path: String,
    },

    /// No datastore with the given name exists.
    #[error("invalid datastore: {name:?}")]
    InvalidDatastore {
        /// The datastore name that did not resolve.
        name: String,
    },

    /// The entity still has dependents.
    #[error("{kind} {name:?} is in use")]
    ResourceInUse {
        /// Kind token of the blocked entity.
        kind: String,
        /// Display name of the blocked entity.
        name: String,
    },

    /// A host-side resource could not be reached.
    #[error("host configuration fault: {message}")]
    HostConfigFault {
        /// Description of the underlying failure.
        message: String,
    },

    /// The target kind does not implement the method.
    #[error("method {method} not supported on {kind}")]
    MethodNotFound {
        /// Kind token of the target.
        kind: String,
        /// Name of the requested method.
        method: String,
    },

    /// Unexpected internal failure.
    #[error("system error: {reason}")]
    SystemError {
        /// Description of the failure.
        reason: String,
    },
}

impl MethodFault {
    /// Returns the taxonomy kind of this fault.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::UnknownKind { .. } => FaultKind::UnknownKind,
            Self::ManagedObjectNotFound { .. }
            | Self::UnresolvedIdentifier { .. }
            | Self::InvalidDatastore { .. } => FaultKind::NotFound,
            Self::InvalidDatastorePath { .. } => FaultKind::InvalidPath,
            Self::ResourceInUse { .. } => FaultKind::ResourceInUse,
            Self::HostConfigFault { .. } => FaultKind::ConfigurationFault,
            Self::MethodNotFound { .. } => FaultKind::NotSupported,
            Self::SystemError { .. } => FaultKind::InternalFault,
        }
    }

    /// Shorthand for [`MethodFault::ManagedObjectNotFound`].
    #[must_use]
    pub fn not_found(reference: &EntityReference) -> Self {
        Self::ManagedObjectNotFound {
            reference: reference.clone(),
        }
    }

    /// Shorthand for [`MethodFault::SystemError`].
    #[must_use]
    pub fn system(reason: impl Into<String>) -> Self {
        Self::SystemError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::EntityKind;

    #[test]
    fn not_found_and_invalid_path_are_distinct_kinds() {
        let missing = MethodFault::InvalidDatastore {
            name: "ds9".to_string(),
        };
        let malformed = MethodFault::InvalidDatastorePath {
            path: "ds9 folder".to_string(),
        };
        assert_eq!(missing.kind(), FaultKind::NotFound);
        assert_eq!(malformed.kind(), FaultKind::InvalidPath);
    }

    #[test]
    fn display_names_the_reference() {
        let fault = MethodFault::not_found(&EntityReference::of(EntityKind::Datastore, "datastore-4"));
        assert_eq!(
            fault.to_string(),
            "managed object not found: Datastore:datastore-4"
        );
    }

    #[test]
    fn faults_serialize() {
        let fault = MethodFault::ResourceInUse {
            kind: "Datastore".to_string(),
            name: "LocalDS_0".to_string(),
        };
        let json = serde_json::to_string(&fault).unwrap();
        let back: MethodFault = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fault);
    }
}
