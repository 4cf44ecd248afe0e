//! Test helpers for building populated simulators.

use tempfile::TempDir;
use vsim_types::{EntityKind, EntityReference, MethodFault};

use crate::config::{ModelConfig, SimulatorConfig};
use crate::model::Model;
use crate::simulator::Simulator;
use crate::task::{TaskInfo, TaskState};

/// Installs a test-writer tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A simulator populated with the default model on a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the simulator is used.
pub fn populated() -> (Simulator, TempDir) {
    populated_with(ModelConfig::default())
}

/// A simulator populated with `model` on a temporary directory.
pub fn populated_with(model: ModelConfig) -> (Simulator, TempDir) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = SimulatorConfig {
        model,
        ..SimulatorConfig::default()
    }
    .with_datastore_root(dir.path());
    let sim = Simulator::new(config);
    Model::new(model).create(&sim).unwrap();
    (sim, dir)
}

/// Looks up an entity reference by kind and name.
pub fn by_name(sim: &Simulator, kind: EntityKind, name: &str) -> EntityReference {
    sim.inventory()
        .find_by_name(kind, name)
        .unwrap_or_else(|| panic!("no {kind} named {name}"))
        .reference()
        .clone()
}

/// Unlinks every machine from `ds` so it can be destroyed.
pub fn evacuate(sim: &Simulator, ds: &EntityReference) {
    sim.with_inventory_mut(|inventory| {
        let vms = inventory
            .get(ds)
            .and_then(|e| e.as_datastore())
            .map(|s| s.vm.clone())
            .unwrap_or_default();
        for vm in &vms {
            inventory
                .remove_reference(ds, crate::entity::RefList::Vm, vm)
                .unwrap();
            inventory
                .remove_reference(vm, crate::entity::RefList::Datastore, ds)
                .unwrap();
        }
    });
}

/// Waits for `task` and asserts it succeeded.
pub fn expect_success(sim: &Simulator, task: &EntityReference) -> TaskInfo {
    let info = sim.wait_task(task).unwrap();
    assert_eq!(info.state, TaskState::Success, "fault: {:?}", info.error);
    info
}

/// Waits for `task` and returns its fault.
pub fn expect_fault(sim: &Simulator, task: &EntityReference) -> MethodFault {
    let info = sim.wait_task(task).unwrap();
    assert_eq!(info.state, TaskState::Error);
    info.error.unwrap()
}
