//! Model builder: populates a simulator with a datacenter-shaped inventory.
//!
//! For each datacenter `DC<d>` the builder creates:
//! - `vm`, `host`, `datastore` and `network` folders
//! - a `VM Network` network
//! - local datastores `LocalDS_<n>` backed by
//!   `<datastore_root>/DC<d>/LocalDS_<n>`
//! - standalone compute resources `DC<d>_H<h>` with one host each
//! - clusters `DC<d>_C<c>` with `cluster_host` hosts each
//! - a root `Resources` pool per compute resource
//! - `machine` virtual machines per compute resource, placed on its first
//!   host, the datacenter's first datastore and the root pool
//!
//! Every host mounts every datastore of its datacenter. Each machine gets a
//! `<vm>/<vm>.vmx` file on its datastore so searches have something to find.
//!
//! # Example
//!
//! ```
//! use vsim_core::model::Model;
//! use vsim_core::{Simulator, SimulatorConfig};
//! use vsim_types::EntityKind;
//!
//! let root = tempfile::tempdir().unwrap();
//! let sim = Simulator::new(SimulatorConfig::default().with_datastore_root(root.path()));
//! Model::new(sim.config().model).create(&sim).unwrap();
//!
//! let inventory = sim.inventory();
//! assert_eq!(inventory.all_of(EntityKind::HostSystem).count(), 4);
//! assert!(inventory.dangling_references().is_empty());
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vsim_types::EntityReference;

use crate::config::ModelConfig;
use crate::entity::{
    ComputeResourceState, DatacenterState, DatastoreState, Entity, EntityInner, FolderState,
    HostState, NetworkState, RefList, ResourcePoolState, VirtualMachineState,
};
use crate::inventory::{Inventory, InventoryError};
use crate::simulator::Simulator;

/// Model creation failures.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The simulator was configured without a datastore root.
    #[error("no datastore root configured")]
    NoDatastoreRoot,

    /// A backing directory or file could not be created.
    #[error("failed to create {path}: {source}")]
    Io {
        /// The path being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The inventory rejected an insertion or link.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// A machine file to create after the inventory is populated.
struct MachineFile {
    datastore_dir: PathBuf,
    machine: String,
}

/// Generates an inventory of the configured shape.
#[derive(Debug, Clone, Copy)]
pub struct Model {
    config: ModelConfig,
}

impl Model {
    /// Creates a builder for the given shape.
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Returns the configured shape.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Populates `sim` and creates the backing directories.
    ///
    /// Returns the datacenters' references.
    ///
    /// # Errors
    ///
    /// - [`ModelError::NoDatastoreRoot`] if the simulator has no datastore
    ///   root
    /// - [`ModelError::Inventory`] if an insertion fails
    /// - [`ModelError::Io`] if a directory or file cannot be created
    pub fn create(&self, sim: &Simulator) -> Result<Vec<EntityReference>, ModelError> {
        let root_dir = sim
            .config()
            .datastore_root
            .clone()
            .ok_or(ModelError::NoDatastoreRoot)?;
        let root_folder = sim.root_folder().clone();

        let mut files = Vec::new();
        let mut datastore_dirs = Vec::new();
        let datacenters = sim.with_inventory_mut(|inventory| {
            let mut builder = Builder {
                inventory,
                config: &self.config,
                root_dir: &root_dir,
                datastore_count: 0,
                datastore_dirs: &mut datastore_dirs,
                files: &mut files,
            };
            (0..self.config.datacenter)
                .map(|d| builder.datacenter(&root_folder, d))
                .collect::<Result<Vec<_>, ModelError>>()
        })?;

        for dir in &datastore_dirs {
            create_dir(dir)?;
        }
        for file in &files {
            let dir = file.datastore_dir.join(&file.machine);
            create_dir(&dir)?;
            let vmx = dir.join(format!("{}.vmx", file.machine));
            std::fs::write(&vmx, format!("displayName = \"{}\"\n", file.machine))
                .map_err(|source| ModelError::Io { path: vmx, source })?;
        }

        info!(
            datacenters = datacenters.len(),
            datastores = datastore_dirs.len(),
            machines = files.len(),
            "model created"
        );
        Ok(datacenters)
    }
}

fn create_dir(path: &Path) -> Result<(), ModelError> {
    std::fs::create_dir_all(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct Builder<'a> {
    inventory: &'a mut Inventory,
    config: &'a ModelConfig,
    root_dir: &'a Path,
    datastore_count: usize,
    datastore_dirs: &'a mut Vec<PathBuf>,
    files: &'a mut Vec<MachineFile>,
}

/// Links shared by every compute resource of one datacenter.
struct DatacenterLinks {
    vm_folder: EntityReference,
    network: EntityReference,
    datastores: Vec<(EntityReference, PathBuf)>,
}

impl Builder<'_> {
    fn datacenter(
        &mut self,
        root_folder: &EntityReference,
        index: usize,
    ) -> Result<EntityReference, ModelError> {
        let name = format!("DC{index}");
        let dc = self.inventory.put_child(
            root_folder,
            Entity::new(&name, EntityInner::Datacenter(DatacenterState::default())),
        )?;

        let vm_folder = self.folder(&dc, "vm", &["Folder", "VirtualMachine", "VirtualApp"])?;
        let host_folder = self.folder(&dc, "host", &["Folder", "ComputeResource"])?;
        let datastore_folder = self.folder(&dc, "datastore", &["Folder", "Datastore", "StoragePod"])?;
        let network_folder = self.folder(
            &dc,
            "network",
            &["Folder", "Network", "DistributedVirtualSwitch"],
        )?;

        if let Some(state) = self
            .inventory
            .get_mut(&dc)
            .and_then(Entity::as_datacenter_mut)
        {
            state.vm_folder = Some(vm_folder.clone());
            state.host_folder = Some(host_folder.clone());
            state.datastore_folder = Some(datastore_folder.clone());
            state.network_folder = Some(network_folder.clone());
        }

        let network = self.inventory.put_child(
            &network_folder,
            Entity::new("VM Network", EntityInner::Network(NetworkState::default())),
        )?;

        let mut datastores = Vec::new();
        for _ in 0..self.config.datastore {
            let ds_name = format!("LocalDS_{}", self.datastore_count);
            self.datastore_count += 1;
            let dir = self.root_dir.join(&name).join(&ds_name);
            let ds = self.inventory.put_child(
                &datastore_folder,
                Entity::new(&ds_name, EntityInner::Datastore(DatastoreState::backed_by(&dir))),
            )?;
            self.datastore_dirs.push(dir.clone());
            datastores.push((ds, dir));
        }

        let links = DatacenterLinks {
            vm_folder,
            network,
            datastores,
        };

        for h in 0..self.config.host {
            let cr_name = format!("{name}_H{h}");
            let hosts = [cr_name.clone()];
            self.compute_resource(&host_folder, &links, &cr_name, false, &hosts)?;
        }
        for c in 0..self.config.cluster {
            let cr_name = format!("{name}_C{c}");
            let hosts: Vec<String> = (0..self.config.cluster_host)
                .map(|i| format!("{cr_name}_H{i}"))
                .collect();
            self.compute_resource(&host_folder, &links, &cr_name, true, &hosts)?;
        }

        debug!(datacenter = %dc, %name, "datacenter populated");
        Ok(dc)
    }

    fn folder(
        &mut self,
        dc: &EntityReference,
        name: &str,
        child_types: &[&str],
    ) -> Result<EntityReference, ModelError> {
        let folder = Entity::new(
            name,
            EntityInner::Folder(FolderState::accepting(child_types.iter().copied())),
        )
        .with_parent(dc.clone());
        Ok(self.inventory.put(folder)?)
    }

    fn compute_resource(
        &mut self,
        host_folder: &EntityReference,
        links: &DatacenterLinks,
        name: &str,
        clustered: bool,
        host_names: &[String],
    ) -> Result<(), ModelError> {
        let state = ComputeResourceState::default();
        let inner = if clustered {
            EntityInner::ClusterComputeResource(state)
        } else {
            EntityInner::ComputeResource(state)
        };
        let cr = self.inventory.put_child(host_folder, Entity::new(name, inner))?;

        let pool = self.inventory.put(
            Entity::new(
                "Resources",
                EntityInner::ResourcePool(ResourcePoolState {
                    owner: Some(cr.clone()),
                    ..ResourcePoolState::default()
                }),
            )
            .with_parent(cr.clone()),
        )?;
        if let Some(state) = self
            .inventory
            .get_mut(&cr)
            .and_then(Entity::as_compute_resource_mut)
        {
            state.resource_pool = Some(pool.clone());
        }

        let mut hosts = Vec::with_capacity(host_names.len());
        for host_name in host_names {
            let host = self.inventory.put(
                Entity::new(host_name, EntityInner::HostSystem(HostState::default()))
                    .with_parent(cr.clone()),
            )?;
            self.inventory.add_reference(&cr, RefList::Host, &host)?;
            self.link_both(&host, RefList::Network, &links.network, RefList::Host)?;
            self.inventory.add_reference(&cr, RefList::Network, &links.network)?;
            for (ds, _) in &links.datastores {
                self.link_both(&host, RefList::Datastore, ds, RefList::Host)?;
                self.inventory.add_reference(&cr, RefList::Datastore, ds)?;
            }
            hosts.push(host);
        }

        let Some(host) = hosts.first() else {
            return Ok(());
        };
        for m in 0..self.config.machine {
            self.machine(links, &format!("{name}_VM{m}"), host, &pool)?;
        }
        Ok(())
    }

    fn machine(
        &mut self,
        links: &DatacenterLinks,
        name: &str,
        host: &EntityReference,
        pool: &EntityReference,
    ) -> Result<(), ModelError> {
        let datastore = links.datastores.first();
        let state = VirtualMachineState {
            host: Some(host.clone()),
            resource_pool: Some(pool.clone()),
            datastore: datastore.map(|(ds, _)| ds.clone()).into_iter().collect(),
            network: vec![links.network.clone()],
        };
        let vm = self.inventory.put_child(
            &links.vm_folder,
            Entity::new(name, EntityInner::VirtualMachine(state)),
        )?;

        self.inventory.add_reference(host, RefList::Vm, &vm)?;
        self.inventory.add_reference(pool, RefList::Vm, &vm)?;
        self.inventory.add_reference(&links.network, RefList::Vm, &vm)?;
        if let Some((ds, dir)) = datastore {
            self.inventory.add_reference(ds, RefList::Vm, &vm)?;
            self.files.push(MachineFile {
                datastore_dir: dir.clone(),
                machine: name.to_string(),
            });
        }
        Ok(())
    }

    /// Adds `a.a_field -> b` and `b.b_field -> a`.
    fn link_both(
        &mut self,
        a: &EntityReference,
        a_field: RefList,
        b: &EntityReference,
        b_field: RefList,
    ) -> Result<(), InventoryError> {
        self.inventory.add_reference(a, a_field, b)?;
        self.inventory.add_reference(b, b_field, a)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use vsim_types::EntityKind;

    fn build(config: ModelConfig) -> (Simulator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let sim = Simulator::new(SimulatorConfig::default().with_datastore_root(dir.path()));
        Model::new(config).create(&sim).unwrap();
        (sim, dir)
    }

    mod shape_tests {
        use super::*;

        #[test]
        fn default_shape() {
            let (sim, _dir) = build(ModelConfig::default());
            let inventory = sim.inventory();

            assert_eq!(inventory.all_of(EntityKind::Datacenter).count(), 1);
            assert_eq!(inventory.all_of(EntityKind::ComputeResource).count(), 1);
            assert_eq!(inventory.all_of(EntityKind::ClusterComputeResource).count(), 1);
            assert_eq!(inventory.all_of(EntityKind::HostSystem).count(), 4);
            assert_eq!(inventory.all_of(EntityKind::Datastore).count(), 1);
            assert_eq!(inventory.all_of(EntityKind::VirtualMachine).count(), 4);
            assert_eq!(inventory.all_of(EntityKind::ResourcePool).count(), 2);
            // root + 4 datacenter folders
            assert_eq!(inventory.all_of(EntityKind::Folder).count(), 5);
            assert!(inventory.dangling_references().is_empty());
        }

        #[test]
        fn datastore_is_mounted_on_every_host() {
            let (sim, _dir) = build(ModelConfig::default());
            let inventory = sim.inventory();
            let ds = inventory.find_by_name(EntityKind::Datastore, "LocalDS_0").unwrap();
            let state = ds.as_datastore().unwrap();

            assert_eq!(state.host.len(), 4);
            assert_eq!(state.vm.len(), 4);
            for host in &state.host {
                let h = inventory.get(host).unwrap();
                assert!(h.as_host().unwrap().datastore.contains(ds.reference()));
                let cr = inventory.host_parent(host).unwrap();
                let cr_state = inventory.get(cr).unwrap().as_compute_resource().unwrap();
                assert!(cr_state.datastore.contains(ds.reference()));
            }
        }

        #[test]
        fn names_follow_the_layout() {
            let (sim, _dir) = build(ModelConfig::default());
            let inventory = sim.inventory();
            for name in ["DC0_H0", "DC0_C0_H2", "DC0_H0_VM1", "DC0_C0_VM0"] {
                assert!(
                    inventory.iter().any(|e| e.name() == name),
                    "missing {name}"
                );
            }
        }

        #[test]
        fn datastore_names_are_unique_across_datacenters() {
            let (sim, _dir) = build(ModelConfig {
                datacenter: 2,
                datastore: 2,
                ..ModelConfig::default()
            });
            let inventory = sim.inventory();
            let mut names: Vec<_> = inventory
                .all_of(EntityKind::Datastore)
                .map(|e| e.name().to_string())
                .collect();
            names.sort();
            assert_eq!(names, vec!["LocalDS_0", "LocalDS_1", "LocalDS_2", "LocalDS_3"]);
        }

        #[test]
        fn empty_cluster_gets_no_machines() {
            let (sim, _dir) = build(ModelConfig {
                host: 0,
                cluster_host: 0,
                ..ModelConfig::default()
            });
            let inventory = sim.inventory();
            assert_eq!(inventory.all_of(EntityKind::VirtualMachine).count(), 0);
            assert!(inventory.dangling_references().is_empty());
        }
    }

    mod backing_tests {
        use super::*;

        #[test]
        fn machine_files_exist() {
            let (sim, dir) = build(ModelConfig::default());
            let vmx = dir.path().join("DC0/LocalDS_0/DC0_H0_VM0/DC0_H0_VM0.vmx");
            assert!(vmx.is_file());

            let inventory = sim.inventory();
            let ds = inventory.find_by_name(EntityKind::Datastore, "LocalDS_0").unwrap();
            assert_eq!(ds.as_datastore().unwrap().url, dir.path().join("DC0/LocalDS_0"));
        }

        #[test]
        fn missing_root_is_an_error() {
            let sim = Simulator::new(SimulatorConfig::default());
            let err = Model::new(ModelConfig::default()).create(&sim).unwrap_err();
            assert!(matches!(err, ModelError::NoDatastoreRoot));
            assert_eq!(sim.inventory().len(), 1);
        }
    }
}
