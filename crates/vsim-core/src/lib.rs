//! # vsim-core
//!
//! Simulation core of the vsim virtualization API test double.
//!
//! This crate keeps the simulated inventory consistent and gives every
//! mutating operation the task lifecycle clients expect from the real
//! management protocol.
//!
//! ## Architecture
//!
//! - **Registry**: kind name to typed wrapper ([`registry`], [`object`])
//! - **Inventory**: the entity graph and its edge helpers ([`inventory`],
//!   [`entity`])
//! - **Task engine**: queued, running, terminal ([`task`])
//! - **Behaviors**: datastore search, refresh and destroy ([`behavior`])
//!
//! Reference parsing and the protocol value types live in `vsim-types`.
//!
//! ## Usage
//!
//! ```
//! use vsim_core::model::Model;
//! use vsim_core::{Request, Response, Simulator, SimulatorConfig};
//! use vsim_types::{SearchDatastoreRequest, SearchSpec};
//!
//! let root = tempfile::tempdir().unwrap();
//! let sim = Simulator::new(SimulatorConfig::default().with_datastore_root(root.path()));
//! Model::new(sim.config().model).create(&sim).unwrap();
//!
//! let ds = sim.find_datastore("LocalDS_0").unwrap();
//! let request = Request::SearchDatastore(SearchDatastoreRequest {
//!     datastore_path: "[LocalDS_0]".to_string(),
//!     search_spec: SearchSpec::matching(["*.vmx"]),
//! });
//! let Response::Task(task) = sim.invoke(&ds, request).unwrap() else {
//!     unreachable!()
//! };
//! let info = sim.wait_task(&task).unwrap();
//! assert!(info.error.is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod behavior;
pub mod config;
pub mod entity;
pub mod event;
pub mod inventory;
pub mod model;
pub mod object;
pub mod registry;
pub mod simulator;
pub mod task;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use config::{ConfigError, ModelConfig, SimulatorConfig};
pub use entity::{Entity, EntityInner, RefList};
pub use event::{Event, EventKind, EventLog};
pub use inventory::{DanglingEdge, Inventory, InventoryError};
pub use model::{Model, ModelError};
pub use object::{ManagedObject, Request, Response};
pub use registry::Registry;
pub use simulator::Simulator;
pub use task::{Task, TaskError, TaskInfo, TaskManager, TaskResult, TaskState, TaskValue};
