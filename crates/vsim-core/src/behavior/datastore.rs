//! Datastore behaviors: browser search, refresh and destroy.
//!
//! Search and destroy are split into a synchronous validation step that
//! returns a created [`Task`] and the task body itself, so path faults are
//! returned to the caller directly while operation faults land on the task.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};
use vsim_types::{
    DatastorePath, EntityKind, EntityReference, HostDatastoreBrowserSearchResults, MethodFault,
    SearchDatastoreRequest,
};

use super::browse::{self, GlobSet};
use crate::entity::{DatastoreState, Entity, RefList};
use crate::event::EventKind;
use crate::inventory::Inventory;
use crate::simulator::Simulator;
use crate::task::{Task, TaskContext, TaskResult, TaskValue};

/// Operation name of the search task.
pub const SEARCH_OPERATION: &str = "SearchDatastore_Task";
/// Operation name of the destroy task.
pub const DESTROY_OPERATION: &str = "Destroy_Task";

/// Parses a bracket-qualified datastore path.
///
/// # Errors
///
/// [`MethodFault::InvalidDatastorePath`] carrying the input when it does not
/// follow the `[name] path` grammar.
pub fn parse_datastore_path(s: &str) -> Result<DatastorePath, MethodFault> {
    s.parse().map_err(|_| MethodFault::InvalidDatastorePath {
        path: s.to_string(),
    })
}

/// Reads the name and backing directory of a datastore.
fn backing(inventory: &Inventory, ds: &EntityReference) -> Result<(String, PathBuf), MethodFault> {
    let entity = inventory.get(ds).ok_or_else(|| MethodFault::not_found(ds))?;
    let state = datastore_state(entity)?;
    Ok((entity.name().to_string(), state.url.clone()))
}

fn datastore_state(entity: &Entity) -> Result<&DatastoreState, MethodFault> {
    entity.as_datastore().ok_or_else(|| {
        MethodFault::system(format!("{} is not a datastore", entity.reference()))
    })
}

// =============================================================================
// Search
// =============================================================================

/// Validates a search request and creates its task.
///
/// The folder may be given relative to the datastore root (`vm1`) or
/// bracket-qualified (`[LocalDS_0] vm1`).
///
/// # Errors
///
/// - [`MethodFault::ManagedObjectNotFound`] if `ds` is gone
/// - [`MethodFault::InvalidDatastorePath`] for a malformed path or one that
///   escapes the datastore root
/// - [`MethodFault::InvalidDatastore`] for a bracketed path naming a
///   different datastore
pub fn search_task(
    sim: &Simulator,
    ds: &EntityReference,
    request: &SearchDatastoreRequest,
) -> Result<Task, MethodFault> {
    let (name, _) = backing(&sim.inventory(), ds)?;
    let folder = resolve_folder(&name, &request.datastore_path)?;
    let base = DatastorePath::new(name, "").join([folder]);

    let request = request.clone();
    Task::create(sim, ds, SEARCH_OPERATION, move |ctx| {
        search_body(ctx, &base, &request)
    })
}

fn resolve_folder(datastore: &str, requested: &str) -> Result<String, MethodFault> {
    let folder = if requested.trim_start().starts_with('[') {
        let parsed = parse_datastore_path(requested)?;
        if parsed.datastore != datastore {
            return Err(MethodFault::InvalidDatastore {
                name: parsed.datastore,
            });
        }
        parsed.path
    } else {
        requested.trim().to_string()
    };

    if browse::is_contained(&folder) {
        Ok(folder)
    } else {
        Err(MethodFault::InvalidDatastorePath {
            path: requested.to_string(),
        })
    }
}

fn search_body(
    ctx: &TaskContext,
    base: &DatastorePath,
    request: &SearchDatastoreRequest,
) -> TaskResult {
    let folder = base.path.as_str();
    let ds = ctx.owner();
    let (_, root) = backing(&ctx.simulator().inventory(), ds)?;

    let globs = GlobSet::new(&request.search_spec.match_pattern);
    let file = browse::search(&root, folder, &globs).map_err(|err| {
        debug!(datastore = %ds, %err, "search walk failed");
        MethodFault::InvalidDatastorePath {
            path: request.datastore_path.clone(),
        }
    })?;

    debug!(datastore = %ds, folder, hits = file.len(), "search finished");
    Ok(Some(TaskValue::SearchResults(
        HostDatastoreBrowserSearchResults {
            datastore: ds.clone(),
            folder_path: base.to_string(),
            file,
        },
    )))
}

// =============================================================================
// Refresh
// =============================================================================

/// Re-checks the backing directory and stamps the refresh time.
///
/// Updates `accessible` either way; `timestamp` only on success.
///
/// # Errors
///
/// - [`MethodFault::ManagedObjectNotFound`] if `ds` is gone
/// - [`MethodFault::HostConfigFault`] if the directory cannot be reached
pub fn refresh(sim: &Simulator, ds: &EntityReference) -> Result<(), MethodFault> {
    let (_, root) = backing(&sim.inventory(), ds)?;

    let checked = match std::fs::metadata(&root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!("{} is not a directory", root.display())),
        Err(err) => Err(format!("{}: {err}", root.display())),
    };

    sim.with_inventory_mut(|inventory| {
        let entity = inventory
            .get_mut(ds)
            .ok_or_else(|| MethodFault::not_found(ds))?;
        let state = entity.as_datastore_mut().ok_or_else(|| {
            MethodFault::system(format!("{ds} is not a datastore"))
        })?;
        state.accessible = checked.is_ok();
        if checked.is_ok() {
            state.timestamp = Some(Utc::now());
        }
        Ok::<(), MethodFault>(())
    })?;

    match checked {
        Ok(()) => {
            debug!(datastore = %ds, "datastore refreshed");
            Ok(())
        }
        Err(message) => {
            warn!(datastore = %ds, %message, "datastore unreachable");
            Err(MethodFault::HostConfigFault { message })
        }
    }
}

// =============================================================================
// Destroy
// =============================================================================

/// Creates the destroy task for `ds`.
///
/// # Errors
///
/// [`MethodFault::ManagedObjectNotFound`] if `ds` is gone.
pub fn destroy_task(sim: &Simulator, ds: &EntityReference) -> Result<Task, MethodFault> {
    Task::create(sim, ds, DESTROY_OPERATION, destroy_body)
}

fn destroy_body(ctx: &TaskContext) -> TaskResult {
    let ds = ctx.owner().clone();
    let sim = ctx.simulator();

    let name = sim.with_inventory_mut(|inventory| cascade(inventory, &ds))?;

    info!(datastore = %ds, %name, "datastore destroyed");
    sim.events().record(EventKind::DatastoreDestroyed {
        datastore: ds,
        name,
    });
    Ok(None)
}

/// Unlinks `ds` from hosts, compute resources and its folder, then removes
/// it. Runs entirely inside one write scope.
///
/// Blocked by a non-empty VM list, in which case nothing is touched. A
/// missing host or parent is logged and skipped; the datastore is removed
/// regardless.
fn cascade(inventory: &mut Inventory, ds: &EntityReference) -> Result<String, MethodFault> {
    let entity = inventory.get(ds).ok_or_else(|| MethodFault::not_found(ds))?;
    let state = datastore_state(entity)?;
    let name = entity.name().to_string();

    if !state.vm.is_empty() {
        return Err(MethodFault::ResourceInUse {
            kind: EntityKind::Datastore.as_str().to_string(),
            name,
        });
    }

    let hosts = state.host.clone();
    let parent = entity.parent().cloned();

    for host in &hosts {
        if let Err(err) = inventory.remove_reference(host, RefList::Datastore, ds) {
            warn!(datastore = %ds, %host, %err, "host unlink skipped");
        }
        match inventory.host_parent(host).cloned() {
            Some(compute) => {
                if let Err(err) = inventory.remove_reference(&compute, RefList::Datastore, ds) {
                    warn!(datastore = %ds, %compute, %err, "compute resource unlink skipped");
                }
            }
            None => warn!(datastore = %ds, %host, "host has no compute resource"),
        }
    }

    if let Some(parent) = parent {
        if let Err(err) = inventory.remove_reference(&parent, RefList::ChildEntity, ds) {
            warn!(datastore = %ds, %parent, %err, "folder unlink skipped");
        }
    }

    inventory.remove(ds);
    Ok(name)
}
