//! Kind-specific state structs for inventory entities.
//!
//! Each struct holds the fields one entity kind carries beyond the common
//! name/parent/reference header. Relationships to other entities are always
//! stored as [`EntityReference`]s, never as owned values.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vsim_types::{EntityKind, EntityReference};

/// State of a `Folder` or `StoragePod`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderState {
    /// Kind tokens this folder accepts as children.
    pub child_type: Vec<String>,
    /// Direct children.
    pub child_entity: Vec<EntityReference>,
}

impl FolderState {
    /// Creates an empty folder accepting the given child kinds.
    #[must_use]
    pub fn accepting<I, S>(child_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            child_type: child_types.into_iter().map(Into::into).collect(),
            child_entity: Vec::new(),
        }
    }

    /// Returns true if a child of `kind` may be placed in this folder.
    ///
    /// A listed kind also admits its subtypes, so `ComputeResource` admits
    /// clusters.
    #[must_use]
    pub fn accepts(&self, kind: EntityKind) -> bool {
        self.child_type.iter().any(|token| {
            token
                .parse::<EntityKind>()
                .is_ok_and(|accepted| kind.is_a(accepted))
        })
    }
}

/// State of a `Datacenter`.
///
/// The four folder links are set once when the datacenter is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatacenterState {
    /// Folder holding virtual machines.
    pub vm_folder: Option<EntityReference>,
    /// Folder holding compute resources.
    pub host_folder: Option<EntityReference>,
    /// Folder holding datastores.
    pub datastore_folder: Option<EntityReference>,
    /// Folder holding networks.
    pub network_folder: Option<EntityReference>,
}

/// State of a `ComputeResource` or `ClusterComputeResource`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResourceState {
    /// Member hosts.
    pub host: Vec<EntityReference>,
    /// Union of the datastores mounted by member hosts.
    pub datastore: Vec<EntityReference>,
    /// Networks available to member hosts.
    pub network: Vec<EntityReference>,
    /// Root resource pool.
    pub resource_pool: Option<EntityReference>,
}

/// State of a `HostSystem`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    /// Mounted datastores.
    pub datastore: Vec<EntityReference>,
    /// Virtual machines registered on this host.
    pub vm: Vec<EntityReference>,
    /// Networks the host is connected to.
    pub network: Vec<EntityReference>,
}

/// State of a `Datastore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreState {
    /// Backing directory on the local file system.
    pub url: PathBuf,
    /// Nominal capacity in bytes.
    pub capacity: i64,
    /// Nominal free space in bytes.
    pub free_space: i64,
    /// Whether the last refresh could reach the backing directory.
    pub accessible: bool,
    /// Time of the last successful refresh.
    pub timestamp: Option<DateTime<Utc>>,
    /// Hosts mounting this datastore.
    pub host: Vec<EntityReference>,
    /// Virtual machines with files on this datastore.
    pub vm: Vec<EntityReference>,
}

impl DatastoreState {
    /// Nominal capacity given to datastores created without one (1 TiB).
    pub const DEFAULT_CAPACITY: i64 = 1 << 40;

    /// Creates an accessible, unmounted datastore backed by `url`.
    #[must_use]
    pub fn backed_by(url: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            capacity: Self::DEFAULT_CAPACITY,
            free_space: Self::DEFAULT_CAPACITY,
            accessible: true,
            timestamp: None,
            host: Vec::new(),
            vm: Vec::new(),
        }
    }
}

/// State of a `ResourcePool` or `VirtualApp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePoolState {
    /// The compute resource this pool belongs to.
    pub owner: Option<EntityReference>,
    /// Child pools.
    pub resource_pool: Vec<EntityReference>,
    /// Machines running in this pool.
    pub vm: Vec<EntityReference>,
}

/// State of a `VirtualMachine`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachineState {
    /// Host the machine is registered on.
    pub host: Option<EntityReference>,
    /// Pool the machine runs in.
    pub resource_pool: Option<EntityReference>,
    /// Datastores holding the machine's files.
    pub datastore: Vec<EntityReference>,
    /// Connected networks.
    pub network: Vec<EntityReference>,
}

/// State of a `Network`, `OpaqueNetwork` or `DistributedVirtualPortgroup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    /// Hosts connected to this network.
    pub host: Vec<EntityReference>,
    /// Machines connected to this network.
    pub vm: Vec<EntityReference>,
}

/// State of a `DistributedVirtualSwitch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchState {
    /// Port groups on the switch.
    pub portgroup: Vec<EntityReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datastore_defaults_to_accessible() {
        let ds = DatastoreState::backed_by("/tmp/ds");
        assert!(ds.accessible);
        assert!(ds.timestamp.is_none());
        assert_eq!(ds.capacity, DatastoreState::DEFAULT_CAPACITY);
    }

    #[test]
    fn folder_accepts_listed_kinds_and_subtypes() {
        let hosts = FolderState::accepting(["Folder", "ComputeResource"]);
        assert!(hosts.accepts(EntityKind::ComputeResource));
        assert!(hosts.accepts(EntityKind::ClusterComputeResource));
        assert!(hosts.accepts(EntityKind::StoragePod));
        assert!(!hosts.accepts(EntityKind::VirtualMachine));
        assert!(!FolderState::default().accepts(EntityKind::Folder));
    }

    #[test]
    fn state_structs_are_serializable() {
        let folder = FolderState::accepting(["Folder", "Datacenter"]);
        let json = serde_json::to_string(&folder).unwrap();
        let back: FolderState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, folder);
    }
}
