//! Typed wrappers around entity references.
//!
//! The wire layer only ever holds an untyped [`EntityReference`]. The
//! [`Registry`](crate::registry::Registry) turns one into a
//! `Box<dyn ManagedObject>`, a thin handle that knows its simulator and
//! reference and exposes the operations legal for its kind.
//!
//! Wrappers hold no entity state of their own. Every call reads the
//! inventory, so a wrapper for an entity that has since been removed
//! reports [`MethodFault::ManagedObjectNotFound`].

mod datastore;
mod task;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use vsim_types::{EntityReference, MethodFault, SearchDatastoreRequest};

use crate::simulator::Simulator;

pub use datastore::Datastore;
pub use task::Task;

// =============================================================================
// Requests
// =============================================================================

/// A method invocation routed through [`Simulator::invoke`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// `SearchDatastore_Task` on a datastore.
    SearchDatastore(SearchDatastoreRequest),
    /// `RefreshDatastore` on a datastore.
    RefreshDatastore,
    /// `Destroy_Task` on a managed entity.
    Destroy,
}

impl Request {
    /// Protocol method name.
    #[must_use]
    pub const fn method_name(&self) -> &'static str {
        match self {
            Self::SearchDatastore(_) => "SearchDatastore_Task",
            Self::RefreshDatastore => "RefreshDatastore",
            Self::Destroy => "Destroy_Task",
        }
    }
}

/// What a dispatched method returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// The method started a task; poll this reference.
    Task(EntityReference),
    /// The method completed synchronously without a value.
    Empty,
}

// =============================================================================
// Managed Object
// =============================================================================

/// State every wrapper carries: the simulator it belongs to and its reference.
#[derive(Clone)]
pub struct Common {
    simulator: Simulator,
    reference: EntityReference,
}

impl Common {
    /// Creates the common part of a wrapper.
    #[must_use]
    pub fn new(simulator: Simulator, reference: EntityReference) -> Self {
        Self {
            simulator,
            reference,
        }
    }

    /// The simulator.
    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// The wrapped reference.
    #[must_use]
    pub fn reference(&self) -> &EntityReference {
        &self.reference
    }
}

impl fmt::Debug for Common {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Common").field(&self.reference).finish()
    }
}

/// A typed handle on one entity.
pub trait ManagedObject: Send + Sync + fmt::Debug {
    /// Simulator and reference.
    fn common(&self) -> &Common;

    /// Upcast for downcasting to the concrete wrapper.
    fn as_any(&self) -> &dyn Any;

    /// Owned upcast for downcasting to the concrete wrapper.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Handles a method invocation.
    ///
    /// The default rejects every request with
    /// [`MethodFault::MethodNotFound`].
    ///
    /// # Errors
    ///
    /// Any fault raised before a task is created.
    fn dispatch(&self, request: Request) -> Result<Response, MethodFault> {
        Err(MethodFault::MethodNotFound {
            kind: self.reference().kind().to_string(),
            method: request.method_name().to_string(),
        })
    }

    /// The wrapped reference.
    fn reference(&self) -> &EntityReference {
        self.common().reference()
    }

    /// The entity's display name, read from the inventory.
    ///
    /// # Errors
    ///
    /// [`MethodFault::ManagedObjectNotFound`] if the entity is gone.
    fn name(&self) -> Result<String, MethodFault> {
        let common = self.common();
        common
            .simulator()
            .inventory()
            .get(common.reference())
            .map(|e| e.name().to_string())
            .ok_or_else(|| MethodFault::not_found(common.reference()))
    }
}

/// Declares a wrapper for a kind with no behaviors beyond the defaults.
macro_rules! plain_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            common: Common,
        }

        impl $name {
            /// Wraps `common` without checking the kind.
            #[must_use]
            pub fn new(common: Common) -> Self {
                Self { common }
            }
        }

        impl ManagedObject for $name {
            fn common(&self) -> &Common {
                &self.common
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn Any> {
                self
            }
        }
    };
}

plain_object!(
    /// A folder.
    Folder
);
plain_object!(
    /// A storage pod.
    StoragePod
);
plain_object!(
    /// A datacenter.
    Datacenter
);
plain_object!(
    /// A virtual machine.
    VirtualMachine
);
plain_object!(
    /// A virtual app.
    VirtualApp
);
plain_object!(
    /// A standalone compute resource.
    ComputeResource
);
plain_object!(
    /// A cluster.
    ClusterComputeResource
);
plain_object!(
    /// A host.
    HostSystem
);
plain_object!(
    /// A standard network.
    Network
);
plain_object!(
    /// An opaque network.
    OpaqueNetwork
);
plain_object!(
    /// A resource pool.
    ResourcePool
);
plain_object!(
    /// A distributed switch.
    DistributedVirtualSwitch
);
plain_object!(
    /// A distributed port group.
    DistributedVirtualPortgroup
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use vsim_types::{EntityKind, FaultKind};

    #[test]
    fn default_dispatch_is_method_not_found() {
        let sim = Simulator::new(SimulatorConfig::default());
        let host = HostSystem::new(Common::new(
            sim,
            EntityReference::of(EntityKind::HostSystem, "host-7"),
        ));

        let fault = host.dispatch(Request::RefreshDatastore).unwrap_err();
        assert_eq!(fault.kind(), FaultKind::NotSupported);
        assert_eq!(
            fault,
            MethodFault::MethodNotFound {
                kind: "HostSystem".to_string(),
                method: "RefreshDatastore".to_string(),
            }
        );
    }

    #[test]
    fn name_reads_the_inventory() {
        let sim = Simulator::new(SimulatorConfig::default());
        let root = Folder::new(Common::new(sim.clone(), sim.root_folder().clone()));
        assert_eq!(root.name().unwrap(), "Datacenters");

        let ghost = Folder::new(Common::new(
            sim,
            EntityReference::of(EntityKind::Folder, "group-d404"),
        ));
        assert_eq!(ghost.name().unwrap_err().kind(), FaultKind::NotFound);
    }
}
