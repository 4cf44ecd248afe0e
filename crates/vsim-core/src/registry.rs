//! Reference registry: kind name to wrapper constructor.
//!
//! The registry is the single seam that turns an untyped
//! [`EntityReference`] into a [`ManagedObject`] with behavior. It is built
//! once through [`RegistryBuilder`] and is read-only afterwards; new kinds
//! are added purely by registering another constructor.
//!
//! # Example
//!
//! ```
//! use vsim_core::registry::Registry;
//! use vsim_core::ManagedObject;
//! use vsim_core::{Simulator, SimulatorConfig};
//! use vsim_types::{EntityKind, EntityReference};
//!
//! let sim = Simulator::new(SimulatorConfig::default());
//! let registry = Registry::global();
//!
//! let reference = EntityReference::of(EntityKind::HostSystem, "host-42");
//! let host = registry.resolve(&sim, &reference).unwrap();
//! assert_eq!(host.reference(), &reference);
//!
//! let bogus = EntityReference::new("Toaster", "toaster-1");
//! assert!(registry.resolve(&sim, &bogus).is_err());
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use vsim_types::{EntityKind, EntityReference, MethodFault};

use crate::object::{self, Common, ManagedObject};
use crate::simulator::Simulator;

/// Builds a wrapper around a reference. Constructors hold no state.
pub type Constructor = fn(Common) -> Box<dyn ManagedObject>;

/// Collects constructors before freezing them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    constructors: HashMap<String, Constructor>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` for `kind`, replacing any earlier entry.
    ///
    /// # Arguments
    ///
    /// * `kind` - Kind token as it appears in references
    /// * `constructor` - Function building the wrapper
    #[must_use]
    pub fn register(mut self, kind: impl Into<String>, constructor: Constructor) -> Self {
        self.constructors.insert(kind.into(), constructor);
        self
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            constructors: self.constructors,
        }
    }
}

/// Immutable kind-to-constructor table.
#[derive(Debug)]
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The built-in table: every entity kind plus `Task`.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(EntityKind::Folder.as_str(), |c| Box::new(object::Folder::new(c)))
            .register(EntityKind::StoragePod.as_str(), |c| {
                Box::new(object::StoragePod::new(c))
            })
            .register(EntityKind::Datacenter.as_str(), |c| {
                Box::new(object::Datacenter::new(c))
            })
            .register(EntityKind::VirtualMachine.as_str(), |c| {
                Box::new(object::VirtualMachine::new(c))
            })
            .register(EntityKind::VirtualApp.as_str(), |c| {
                Box::new(object::VirtualApp::new(c))
            })
            .register(EntityKind::ComputeResource.as_str(), |c| {
                Box::new(object::ComputeResource::new(c))
            })
            .register(EntityKind::ClusterComputeResource.as_str(), |c| {
                Box::new(object::ClusterComputeResource::new(c))
            })
            .register(EntityKind::HostSystem.as_str(), |c| {
                Box::new(object::HostSystem::new(c))
            })
            .register(EntityKind::Network.as_str(), |c| Box::new(object::Network::new(c)))
            .register(EntityKind::OpaqueNetwork.as_str(), |c| {
                Box::new(object::OpaqueNetwork::new(c))
            })
            .register(EntityKind::ResourcePool.as_str(), |c| {
                Box::new(object::ResourcePool::new(c))
            })
            .register(EntityKind::DistributedVirtualSwitch.as_str(), |c| {
                Box::new(object::DistributedVirtualSwitch::new(c))
            })
            .register(EntityKind::DistributedVirtualPortgroup.as_str(), |c| {
                Box::new(object::DistributedVirtualPortgroup::new(c))
            })
            .register(EntityKind::Datastore.as_str(), |c| {
                Box::new(object::Datastore::new(c))
            })
            .register(EntityKind::Task.as_str(), |c| Box::new(object::Task::new(c)))
            .build()
    }

    /// The process-wide built-in registry, created on first use.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Builds the wrapper for `reference`.
    ///
    /// Does not check that the entity exists; operations on the wrapper do.
    ///
    /// # Errors
    ///
    /// [`MethodFault::UnknownKind`] if no constructor is registered for the
    /// reference's kind.
    pub fn resolve(
        &self,
        simulator: &Simulator,
        reference: &EntityReference,
    ) -> Result<Box<dyn ManagedObject>, MethodFault> {
        let constructor =
            self.constructors
                .get(reference.kind())
                .ok_or_else(|| MethodFault::UnknownKind {
                    kind: reference.kind().to_string(),
                })?;
        Ok(constructor(Common::new(simulator.clone(), reference.clone())))
    }

    /// Builds the wrapper for `reference` as the concrete type `T`.
    ///
    /// # Errors
    ///
    /// [`MethodFault::UnknownKind`] if the kind is unregistered or its
    /// wrapper is not a `T`.
    pub fn resolve_as<T: ManagedObject + 'static>(
        &self,
        simulator: &Simulator,
        reference: &EntityReference,
    ) -> Result<T, MethodFault> {
        self.resolve(simulator, reference)?
            .into_any()
            .downcast::<T>()
            .map(|wrapper| *wrapper)
            .map_err(|_| MethodFault::UnknownKind {
                kind: reference.kind().to_string(),
            })
    }

    /// Returns true if `kind` has a constructor.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind tokens, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::object::{Datastore, HostSystem};
    use vsim_types::FaultKind;

    fn sim() -> Simulator {
        Simulator::new(SimulatorConfig::default())
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn every_kind_resolves_to_its_own_reference() {
            let sim = sim();
            let registry = Registry::global();
            for kind in EntityKind::ALL {
                let reference = EntityReference::of(kind, "any-id");
                let wrapper = registry.resolve(&sim, &reference).unwrap();
                assert_eq!(wrapper.reference(), &reference, "kind {kind}");
            }
            assert_eq!(registry.len(), EntityKind::ALL.len());
        }

        #[test]
        fn unknown_kind_is_a_typed_fault() {
            let sim = sim();
            let fault = Registry::global()
                .resolve(&sim, &EntityReference::new("Toaster", "t-1"))
                .unwrap_err();
            assert_eq!(fault.kind(), FaultKind::UnknownKind);
            assert_eq!(
                fault,
                MethodFault::UnknownKind {
                    kind: "Toaster".to_string()
                }
            );
        }

        #[test]
        fn resolve_as_downcasts_matching_kinds_only() {
            let sim = sim();
            let registry = Registry::global();
            let ds_ref = EntityReference::of(EntityKind::Datastore, "datastore-3");

            let ds: Datastore = registry.resolve_as(&sim, &ds_ref).unwrap();
            assert_eq!(ds.reference(), &ds_ref);

            let err = registry.resolve_as::<HostSystem>(&sim, &ds_ref).unwrap_err();
            assert_eq!(err.kind(), FaultKind::UnknownKind);
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn custom_registry_only_knows_its_entries() {
            let registry = Registry::builder()
                .register("Folder", |c| Box::new(object::Folder::new(c)))
                .build();
            assert!(registry.contains("Folder"));
            assert!(!registry.contains("Datastore"));
            assert_eq!(registry.kinds(), vec!["Folder"]);

            let sim = sim();
            let ds_ref = EntityReference::of(EntityKind::Datastore, "datastore-3");
            assert!(registry.resolve(&sim, &ds_ref).is_err());
        }

        #[test]
        fn empty_registry() {
            let registry = RegistryBuilder::new().build();
            assert!(registry.is_empty());
        }
    }
}
