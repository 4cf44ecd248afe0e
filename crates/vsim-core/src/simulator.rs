//! The simulator: shared inventory, task engine and event log.
//!
//! [`Simulator`] is a cheap-to-clone handle on shared state:
//! - the inventory behind one `RwLock` (the only shared mutable graph)
//! - the [`TaskManager`] holding every task record
//! - the [`EventLog`]
//!
//! # Invocation flow
//!
//! 1. **RESOLVE**: the target reference goes through the
//!    [`Registry`](crate::registry::Registry)
//! 2. **DISPATCH**: the wrapper validates the request and creates a task
//! 3. **RUN**: the task body reads and mutates the inventory under the lock
//! 4. **POLL**: the caller reads the terminal [`TaskInfo`]
//!
//! # Concurrency
//!
//! Task bodies take the write lock once for all of their structural edits,
//! so readers see either none or all of a task's mutations.
//! [`Simulator::run_tasks`] runs a batch in parallel with rayon; writes stay
//! serialized by the lock.
//!
//! # Example
//!
//! ```
//! use vsim_core::{ManagedObject, Request, Simulator, SimulatorConfig};
//!
//! let sim = Simulator::new(SimulatorConfig::default());
//! let root = sim.resolve_str("group-d1").unwrap();
//! assert_eq!(root.name().unwrap(), "Datacenters");
//!
//! // Folders do not implement datastore methods.
//! assert!(sim.invoke(sim.root_folder(), Request::RefreshDatastore).is_err());
//! ```

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;
use vsim_types::{reference_from_string, DatastorePath, EntityKind, EntityReference, MethodFault};

use crate::behavior::datastore as datastore_behavior;
use crate::config::SimulatorConfig;
use crate::entity::{Entity, EntityInner, FolderState};
use crate::event::{Event, EventLog};
use crate::inventory::Inventory;
use crate::object::{ManagedObject, Request, Response};
use crate::registry::Registry;
use crate::task::{Task, TaskInfo, TaskManager};

/// Name of the root folder.
pub const ROOT_FOLDER_NAME: &str = "Datacenters";

#[derive(Debug)]
struct Shared {
    config: SimulatorConfig,
    root_folder: EntityReference,
    inventory: RwLock<Inventory>,
    tasks: TaskManager,
    events: EventLog,
}

/// Handle on one simulated environment.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct Simulator {
    shared: Arc<Shared>,
}

impl Simulator {
    /// Creates a simulator holding only the root folder (`group-d1`).
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let root = Entity::new(
            ROOT_FOLDER_NAME,
            EntityInner::Folder(FolderState::accepting([
                EntityKind::Folder.as_str(),
                EntityKind::Datacenter.as_str(),
            ])),
        );
        let (inventory, root_folder) = Inventory::with_root(root);
        let events = EventLog::new(config.event_history_limit);

        Self {
            shared: Arc::new(Shared {
                config,
                root_folder,
                inventory: RwLock::new(inventory),
                tasks: TaskManager::new(),
                events,
            }),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.shared.config
    }

    /// Returns the root folder's reference.
    #[must_use]
    pub fn root_folder(&self) -> &EntityReference {
        &self.shared.root_folder
    }

    // -------------------------------------------------------------------------
    // Inventory access
    // -------------------------------------------------------------------------

    /// Takes the read lock on the inventory.
    ///
    /// Hold the guard briefly; task bodies wait for it to be released.
    pub fn inventory(&self) -> RwLockReadGuard<'_, Inventory> {
        self.shared.inventory.read()
    }

    /// Runs `f` with exclusive access to the inventory.
    ///
    /// Everything `f` does is observed atomically by readers.
    pub fn with_inventory_mut<R>(&self, f: impl FnOnce(&mut Inventory) -> R) -> R {
        let mut inventory = self.shared.inventory.write();
        f(&mut inventory)
    }

    /// Returns a copy of the current inventory.
    #[must_use]
    pub fn snapshot(&self) -> Inventory {
        self.inventory().clone()
    }

    // -------------------------------------------------------------------------
    // Resolution and dispatch
    // -------------------------------------------------------------------------

    /// Resolves a reference through the global registry.
    ///
    /// # Errors
    ///
    /// [`MethodFault::UnknownKind`] for unregistered kinds.
    pub fn resolve(&self, reference: &EntityReference) -> Result<Box<dyn ManagedObject>, MethodFault> {
        Registry::global().resolve(self, reference)
    }

    /// Resolves a reference as the concrete wrapper `T`.
    ///
    /// # Errors
    ///
    /// [`MethodFault::UnknownKind`] if the kind is unregistered or not `T`.
    pub fn resolve_as<T: ManagedObject + 'static>(
        &self,
        reference: &EntityReference,
    ) -> Result<T, MethodFault> {
        Registry::global().resolve_as(self, reference)
    }

    /// Parses an external identifier and resolves it.
    ///
    /// # Errors
    ///
    /// [`MethodFault::UnresolvedIdentifier`] if the string does not parse,
    /// otherwise as [`Simulator::resolve`].
    pub fn resolve_str(&self, s: &str) -> Result<Box<dyn ManagedObject>, MethodFault> {
        let reference = reference_from_string(s).ok_or_else(|| MethodFault::UnresolvedIdentifier {
            input: s.to_string(),
        })?;
        self.resolve(&reference)
    }

    /// Resolves `reference` and dispatches `request` to its wrapper.
    ///
    /// # Errors
    ///
    /// Resolution faults, [`MethodFault::MethodNotFound`] for requests the
    /// kind does not handle, and any fault raised before a task is created.
    /// Faults raised inside a task are on the task record instead.
    pub fn invoke(
        &self,
        reference: &EntityReference,
        request: Request,
    ) -> Result<Response, MethodFault> {
        self.resolve(reference)?.dispatch(request)
    }

    /// Runs created tasks in parallel and returns their references in input
    /// order.
    #[allow(clippy::unused_self)]
    pub fn run_tasks(&self, tasks: Vec<Task>) -> Vec<EntityReference> {
        tasks.into_par_iter().map(Task::run).collect()
    }

    // -------------------------------------------------------------------------
    // Datastore paths
    // -------------------------------------------------------------------------

    /// Parses a bracket-qualified datastore path.
    ///
    /// # Errors
    ///
    /// [`MethodFault::InvalidDatastorePath`] for malformed input.
    pub fn parse_datastore_path(&self, s: &str) -> Result<DatastorePath, MethodFault> {
        datastore_behavior::parse_datastore_path(s)
    }

    /// Finds a datastore by name.
    ///
    /// # Errors
    ///
    /// [`MethodFault::InvalidDatastore`] if no datastore has that name.
    pub fn find_datastore(&self, name: &str) -> Result<EntityReference, MethodFault> {
        self.inventory()
            .find_by_name(EntityKind::Datastore, name)
            .map(|e| e.reference().clone())
            .ok_or_else(|| MethodFault::InvalidDatastore {
                name: name.to_string(),
            })
    }

    // -------------------------------------------------------------------------
    // Tasks and events
    // -------------------------------------------------------------------------

    /// Returns the task manager.
    #[must_use]
    pub fn tasks(&self) -> &TaskManager {
        &self.shared.tasks
    }

    /// Returns a snapshot of a task record.
    #[must_use]
    pub fn task_info(&self, task: &EntityReference) -> Option<TaskInfo> {
        self.shared.tasks.info(task)
    }

    /// Blocks until `task` is terminal.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] for an unknown task.
    pub fn wait_task(&self, task: &EntityReference) -> Result<TaskInfo, MethodFault> {
        Ok(self.shared.tasks.wait(task)?)
    }

    /// Returns the event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.shared.events
    }

    /// Drains the event log.
    pub fn take_events(&self) -> Vec<Event> {
        self.shared.events.take_events()
    }
}
