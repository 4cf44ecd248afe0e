//! Inventory entities.
//!
//! This module provides the node type of the inventory graph:
//! - [`Entity`]: common header (reference, name, parent, recent tasks) plus
//!   kind-specific state
//! - [`EntityInner`]: type-safe storage for the kind-specific state
//! - [`RefList`]: names of the reference-list fields that hold structural
//!   edges to other entities
//!
//! # Ownership
//!
//! Entities never own each other. Every relationship (folder to child, host
//! to datastore, datastore to host, ...) is an [`EntityReference`] resolved
//! through the inventory, which is what lets the graph contain cycles.
//!
//! # Example
//!
//! Reference lists are read through [`Entity::ref_list`] and edited only
//! through the inventory's edge helpers.
//!
//! ```
//! use vsim_core::entity::{Entity, EntityInner, FolderState, RefList, VirtualMachineState};
//! use vsim_core::inventory::Inventory;
//! use vsim_types::EntityKind;
//!
//! let folder = Entity::new("vm", EntityInner::Folder(FolderState::accepting(["VirtualMachine"])));
//! assert_eq!(folder.kind(), EntityKind::Folder);
//! assert!(folder.reference().is_unset());
//!
//! let mut inventory = Inventory::new();
//! let folder = inventory.put(folder).unwrap();
//! let vm = inventory
//!     .put(Entity::new("vm1", EntityInner::VirtualMachine(VirtualMachineState::default())))
//!     .unwrap();
//! assert!(inventory.add_reference(&folder, RefList::ChildEntity, &vm).unwrap());
//! assert_eq!(
//!     inventory.get(&folder).unwrap().ref_list(RefList::ChildEntity).unwrap(),
//!     &[vm]
//! );
//! ```
//!
//! Lists cannot be edited from outside the crate:
//!
//! ```compile_fail
//! use vsim_core::entity::{Entity, EntityInner, FolderState, RefList};
//! use vsim_types::{EntityKind, EntityReference};
//!
//! let mut folder = Entity::new("vm", EntityInner::Folder(FolderState::default()));
//! let vm = EntityReference::of(EntityKind::VirtualMachine, "vm-9");
//! folder.ref_list_mut(RefList::ChildEntity).unwrap().push(vm);
//! ```

pub mod state;

use serde::{Deserialize, Serialize};
use std::fmt;
use vsim_types::{EntityKind, EntityReference};

pub use state::{
    ComputeResourceState, DatacenterState, DatastoreState, FolderState, HostState, NetworkState,
    ResourcePoolState, SwitchState, VirtualMachineState,
};

// =============================================================================
// Reference list fields
// =============================================================================

/// Names of the reference-list fields that carry structural edges.
///
/// Inventory helpers take a `RefList` to say which list on the owner entity
/// to edit; an owner whose kind has no such list rejects the edit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefList {
    /// `childEntity` on folders and storage pods.
    ChildEntity,
    /// `host` on compute resources, datastores and networks.
    Host,
    /// `datastore` on compute resources, hosts and machines.
    Datastore,
    /// `vm` on hosts, datastores, pools and networks.
    Vm,
    /// `network` on compute resources, hosts and machines.
    Network,
    /// `resourcePool` child list on pools.
    ResourcePool,
    /// `portgroup` on distributed switches.
    Portgroup,
}

impl RefList {
    /// Returns the protocol field name.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::ChildEntity => "childEntity",
            Self::Host => "host",
            Self::Datastore => "datastore",
            Self::Vm => "vm",
            Self::Network => "network",
            Self::ResourcePool => "resourcePool",
            Self::Portgroup => "portgroup",
        }
    }
}

impl fmt::Display for RefList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

// =============================================================================
// Entity inner storage
// =============================================================================

/// Type-safe storage for kind-specific state.
///
/// Kinds that share a shape share a state struct (`Folder`/`StoragePod`,
/// the three network kinds, the two compute-resource kinds, the two pool
/// kinds); the variant still records the exact kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityInner {
    /// A folder.
    Folder(FolderState),
    /// A storage pod (datastore folder).
    StoragePod(FolderState),
    /// A datacenter.
    Datacenter(DatacenterState),
    /// A standalone compute resource.
    ComputeResource(ComputeResourceState),
    /// A cluster.
    ClusterComputeResource(ComputeResourceState),
    /// A host.
    HostSystem(HostState),
    /// A datastore.
    Datastore(DatastoreState),
    /// A resource pool.
    ResourcePool(ResourcePoolState),
    /// A virtual app.
    VirtualApp(ResourcePoolState),
    /// A virtual machine.
    VirtualMachine(VirtualMachineState),
    /// A standard network.
    Network(NetworkState),
    /// An opaque network.
    OpaqueNetwork(NetworkState),
    /// A distributed port group.
    DistributedVirtualPortgroup(NetworkState),
    /// A distributed switch.
    DistributedVirtualSwitch(SwitchState),
}

impl EntityInner {
    /// Returns the entity kind this storage represents.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Folder(_) => EntityKind::Folder,
            Self::StoragePod(_) => EntityKind::StoragePod,
            Self::Datacenter(_) => EntityKind::Datacenter,
            Self::ComputeResource(_) => EntityKind::ComputeResource,
            Self::ClusterComputeResource(_) => EntityKind::ClusterComputeResource,
            Self::HostSystem(_) => EntityKind::HostSystem,
            Self::Datastore(_) => EntityKind::Datastore,
            Self::ResourcePool(_) => EntityKind::ResourcePool,
            Self::VirtualApp(_) => EntityKind::VirtualApp,
            Self::VirtualMachine(_) => EntityKind::VirtualMachine,
            Self::Network(_) => EntityKind::Network,
            Self::OpaqueNetwork(_) => EntityKind::OpaqueNetwork,
            Self::DistributedVirtualPortgroup(_) => EntityKind::DistributedVirtualPortgroup,
            Self::DistributedVirtualSwitch(_) => EntityKind::DistributedVirtualSwitch,
        }
    }

    /// Returns the named reference list, if this kind has one.
    #[must_use]
    pub fn ref_list(&self, field: RefList) -> Option<&Vec<EntityReference>> {
        match (self, field) {
            (Self::Folder(s) | Self::StoragePod(s), RefList::ChildEntity) => Some(&s.child_entity),
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Host) => {
                Some(&s.host)
            }
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Datastore) => {
                Some(&s.datastore)
            }
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Network) => {
                Some(&s.network)
            }
            (Self::HostSystem(s), RefList::Datastore) => Some(&s.datastore),
            (Self::HostSystem(s), RefList::Vm) => Some(&s.vm),
            (Self::HostSystem(s), RefList::Network) => Some(&s.network),
            (Self::Datastore(s), RefList::Host) => Some(&s.host),
            (Self::Datastore(s), RefList::Vm) => Some(&s.vm),
            (Self::ResourcePool(s) | Self::VirtualApp(s), RefList::ResourcePool) => {
                Some(&s.resource_pool)
            }
            (Self::ResourcePool(s) | Self::VirtualApp(s), RefList::Vm) => Some(&s.vm),
            (Self::VirtualMachine(s), RefList::Datastore) => Some(&s.datastore),
            (Self::VirtualMachine(s), RefList::Network) => Some(&s.network),
            (
                Self::Network(s) | Self::OpaqueNetwork(s) | Self::DistributedVirtualPortgroup(s),
                RefList::Host,
            ) => Some(&s.host),
            (
                Self::Network(s) | Self::OpaqueNetwork(s) | Self::DistributedVirtualPortgroup(s),
                RefList::Vm,
            ) => Some(&s.vm),
            (Self::DistributedVirtualSwitch(s), RefList::Portgroup) => Some(&s.portgroup),
            _ => None,
        }
    }

    /// Returns the named reference list mutably, if this kind has one.
    #[must_use]
    pub(crate) fn ref_list_mut(&mut self, field: RefList) -> Option<&mut Vec<EntityReference>> {
        match (self, field) {
            (Self::Folder(s) | Self::StoragePod(s), RefList::ChildEntity) => {
                Some(&mut s.child_entity)
            }
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Host) => {
                Some(&mut s.host)
            }
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Datastore) => {
                Some(&mut s.datastore)
            }
            (Self::ComputeResource(s) | Self::ClusterComputeResource(s), RefList::Network) => {
                Some(&mut s.network)
            }
            (Self::HostSystem(s), RefList::Datastore) => Some(&mut s.datastore),
            (Self::HostSystem(s), RefList::Vm) => Some(&mut s.vm),
            (Self::HostSystem(s), RefList::Network) => Some(&mut s.network),
            (Self::Datastore(s), RefList::Host) => Some(&mut s.host),
            (Self::Datastore(s), RefList::Vm) => Some(&mut s.vm),
            (Self::ResourcePool(s) | Self::VirtualApp(s), RefList::ResourcePool) => {
                Some(&mut s.resource_pool)
            }
            (Self::ResourcePool(s) | Self::VirtualApp(s), RefList::Vm) => Some(&mut s.vm),
            (Self::VirtualMachine(s), RefList::Datastore) => Some(&mut s.datastore),
            (Self::VirtualMachine(s), RefList::Network) => Some(&mut s.network),
            (
                Self::Network(s) | Self::OpaqueNetwork(s) | Self::DistributedVirtualPortgroup(s),
                RefList::Host,
            ) => Some(&mut s.host),
            (
                Self::Network(s) | Self::OpaqueNetwork(s) | Self::DistributedVirtualPortgroup(s),
                RefList::Vm,
            ) => Some(&mut s.vm),
            (Self::DistributedVirtualSwitch(s), RefList::Portgroup) => Some(&mut s.portgroup),
            _ => None,
        }
    }

    /// Single-valued structural links, by field name.
    fn single_links(&self) -> Vec<(&'static str, &EntityReference)> {
        let links: Vec<(&'static str, Option<&EntityReference>)> = match self {
            Self::Datacenter(s) => vec![
                ("vmFolder", s.vm_folder.as_ref()),
                ("hostFolder", s.host_folder.as_ref()),
                ("datastoreFolder", s.datastore_folder.as_ref()),
                ("networkFolder", s.network_folder.as_ref()),
            ],
            Self::ComputeResource(s) | Self::ClusterComputeResource(s) => {
                vec![("resourcePool", s.resource_pool.as_ref())]
            }
            Self::ResourcePool(s) | Self::VirtualApp(s) => vec![("owner", s.owner.as_ref())],
            Self::VirtualMachine(s) => vec![
                ("runtime.host", s.host.as_ref()),
                ("resourcePool", s.resource_pool.as_ref()),
            ],
            _ => Vec::new(),
        };

        links
            .into_iter()
            .filter_map(|(name, link)| link.map(|r| (name, r)))
            .collect()
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A node of the inventory graph.
///
/// # Invariants
///
/// - The reference's kind always matches [`EntityInner::kind`].
/// - Once inserted, the reference never changes.
/// - `recent_task` holds task references owned by the task engine; they are
///   not structural edges and are left out of serialized snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    reference: EntityReference,
    name: String,
    parent: Option<EntityReference>,
    #[serde(skip)]
    recent_task: Vec<EntityReference>,
    inner: EntityInner,
}

impl Entity {
    /// Creates a root-level entity with an unset reference.
    ///
    /// The inventory assigns the identifier on insertion.
    #[must_use]
    pub fn new(name: impl Into<String>, inner: EntityInner) -> Self {
        Self {
            reference: EntityReference::unset(inner.kind()),
            name: name.into(),
            parent: None,
            recent_task: Vec::new(),
            inner,
        }
    }

    /// Sets an explicit identifier instead of letting the inventory mint one.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.reference = EntityReference::of(self.inner.kind(), id);
        self
    }

    /// Sets the parent link.
    #[must_use]
    pub fn with_parent(mut self, parent: EntityReference) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns this entity's reference.
    #[must_use]
    pub fn reference(&self) -> &EntityReference {
        &self.reference
    }

    pub(crate) fn assign_reference(&mut self, reference: EntityReference) {
        self.reference = reference;
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<&EntityReference> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntityReference>) {
        self.parent = parent;
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.inner.kind()
    }

    /// Returns the kind-specific state.
    #[must_use]
    pub fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Recently run tasks, oldest first.
    #[must_use]
    pub fn recent_task(&self) -> &[EntityReference] {
        &self.recent_task
    }

    /// Appends a task reference, keeping at most `limit` entries.
    pub(crate) fn push_recent_task(&mut self, task: EntityReference, limit: usize) {
        self.recent_task.push(task);
        if self.recent_task.len() > limit {
            let excess = self.recent_task.len() - limit;
            self.recent_task.drain(..excess);
        }
    }

    /// Returns the named reference list, if this kind has one.
    #[must_use]
    pub fn ref_list(&self, field: RefList) -> Option<&Vec<EntityReference>> {
        self.inner.ref_list(field)
    }

    /// Returns the named reference list mutably, if this kind has one.
    ///
    /// Crate-internal: only the inventory's edge helpers edit lists.
    #[must_use]
    pub(crate) fn ref_list_mut(&mut self, field: RefList) -> Option<&mut Vec<EntityReference>> {
        self.inner.ref_list_mut(field)
    }

    /// All outgoing structural edges as `(field name, target)` pairs,
    /// including the parent link.
    #[must_use]
    pub fn edges(&self) -> Vec<(&'static str, &EntityReference)> {
        const LISTS: [RefList; 7] = [
            RefList::ChildEntity,
            RefList::Host,
            RefList::Datastore,
            RefList::Vm,
            RefList::Network,
            RefList::ResourcePool,
            RefList::Portgroup,
        ];

        let mut edges = Vec::new();
        if let Some(parent) = &self.parent {
            edges.push(("parent", parent));
        }
        for field in LISTS {
            if let Some(list) = self.inner.ref_list(field) {
                edges.extend(list.iter().map(|r| (field.field_name(), r)));
            }
        }
        edges.extend(self.inner.single_links());
        edges
    }

    /// Returns the folder state, for folders and storage pods.
    #[must_use]
    pub const fn as_folder(&self) -> Option<&FolderState> {
        match &self.inner {
            EntityInner::Folder(s) | EntityInner::StoragePod(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the datacenter state, if this is a datacenter.
    #[must_use]
    pub const fn as_datacenter(&self) -> Option<&DatacenterState> {
        match &self.inner {
            EntityInner::Datacenter(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the datacenter state mutably, if this is a datacenter.
    #[must_use]
    pub(crate) fn as_datacenter_mut(&mut self) -> Option<&mut DatacenterState> {
        match &mut self.inner {
            EntityInner::Datacenter(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the compute resource state, for standalone and clustered kinds.
    #[must_use]
    pub const fn as_compute_resource(&self) -> Option<&ComputeResourceState> {
        match &self.inner {
            EntityInner::ComputeResource(s) | EntityInner::ClusterComputeResource(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the compute resource state mutably.
    #[must_use]
    pub(crate) fn as_compute_resource_mut(&mut self) -> Option<&mut ComputeResourceState> {
        match &mut self.inner {
            EntityInner::ComputeResource(s) | EntityInner::ClusterComputeResource(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the host state, if this is a host.
    #[must_use]
    pub const fn as_host(&self) -> Option<&HostState> {
        match &self.inner {
            EntityInner::HostSystem(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the datastore state, if this is a datastore.
    #[must_use]
    pub const fn as_datastore(&self) -> Option<&DatastoreState> {
        match &self.inner {
            EntityInner::Datastore(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the datastore state mutably, if this is a datastore.
    #[must_use]
    pub(crate) fn as_datastore_mut(&mut self) -> Option<&mut DatastoreState> {
        match &mut self.inner {
            EntityInner::Datastore(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the pool state, for resource pools and virtual apps.
    #[must_use]
    pub const fn as_resource_pool(&self) -> Option<&ResourcePoolState> {
        match &self.inner {
            EntityInner::ResourcePool(s) | EntityInner::VirtualApp(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the machine state, if this is a virtual machine.
    #[must_use]
    pub const fn as_virtual_machine(&self) -> Option<&VirtualMachineState> {
        match &self.inner {
            EntityInner::VirtualMachine(s) => Some(s),
            _ => None,
        }
    }
}
