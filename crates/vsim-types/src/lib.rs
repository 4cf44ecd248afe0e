//! # vsim-types
//!
//! Protocol-level value types for the vsim virtualization API simulator.
//!
//! Nothing in this crate touches the simulated inventory. It defines how
//! objects are named ([`EntityReference`], [`EntityKind`]), how external
//! identifier and path strings decode ([`reference_from_string`],
//! [`DatastorePath`]), the typed faults clients branch on ([`MethodFault`]),
//! and the request/response shapes the core consumes and produces.
//!
//! ## Quick Start
//!
//! ```
//! use vsim_types::{reference_from_string, DatastorePath, EntityKind};
//!
//! let vm = reference_from_string("vm-2").unwrap();
//! assert_eq!(vm.known_kind(), Some(EntityKind::VirtualMachine));
//!
//! let path: DatastorePath = "[LocalDS_0] vm-2/vm-2.vmx".parse().unwrap();
//! assert_eq!(path.datastore, "LocalDS_0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod datastore_path;
pub mod fault;
pub mod kind;
pub mod methods;
pub mod reference;

// Re-exports for convenience
pub use datastore_path::{DatastorePath, DatastorePathError};
pub use fault::{FaultKind, MethodFault};
pub use kind::{EntityKind, UnknownKind};
pub use methods::{FileInfo, HostDatastoreBrowserSearchResults, SearchDatastoreRequest, SearchSpec};
pub use reference::{kind_from_id, reference_from_string, EntityReference, ParseReferenceError};
