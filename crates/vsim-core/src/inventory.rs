//! Inventory module: the authoritative graph of simulated entities.
//!
//! The [`Inventory`] stores every entity keyed by its [`EntityReference`] and
//! guards the graph's structural consistency. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Identifier minting for entities inserted with an unset reference
//! - Edge helpers ([`Inventory::add_reference`], [`Inventory::remove_reference`])
//!   that are the only sanctioned way to edit reference lists
//! - Invariant inspection ([`Inventory::dangling_references`],
//!   [`Inventory::referrers`])
//!
//! # No cascading
//!
//! [`Inventory::remove`] deletes exactly one entity. Removing the edges that
//! point at it is the caller's job (see the datastore destroy behavior);
//! until it is done, [`Inventory::dangling_references`] reports them.
//!
//! # Locking
//!
//! The inventory itself is a plain value. The simulator keeps it behind a
//! single `RwLock` and task bodies do all of their edits inside one write
//! scope, so readers never see half of a task's mutations.
//!
//! # Example
//!
//! ```
//! use vsim_core::entity::{DatastoreState, Entity, EntityInner, FolderState};
//! use vsim_core::inventory::Inventory;
//!
//! let mut inventory = Inventory::new();
//! let folder = inventory
//!     .put(Entity::new("datastore", EntityInner::Folder(FolderState::accepting(["Datastore"]))))
//!     .unwrap();
//! let ds = inventory
//!     .put_child(&folder, Entity::new("ds1", EntityInner::Datastore(DatastoreState::backed_by("/tmp"))))
//!     .unwrap();
//!
//! assert_eq!(inventory.get(&ds).unwrap().parent(), Some(&folder));
//! assert!(inventory.dangling_references().is_empty());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vsim_types::{EntityKind, EntityReference, MethodFault};

use crate::entity::{Entity, RefList};

// =============================================================================
// Errors
// =============================================================================

/// Structural failures of inventory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// An entity with this reference is already present.
    #[error("duplicate reference: {0}")]
    Duplicate(EntityReference),

    /// The entity is not present.
    #[error("entity not found: {0}")]
    NotFound(EntityReference),

    /// The owner's kind has no such reference list.
    #[error("{owner} has no {field} list")]
    NoSuchField {
        /// The entity whose list was addressed.
        owner: EntityReference,
        /// The requested list.
        field: RefList,
    },

    /// The parent folder does not accept children of this kind.
    #[error("{parent} does not accept {kind} children")]
    ChildTypeRejected {
        /// The folder.
        parent: EntityReference,
        /// Kind of the rejected child.
        kind: EntityKind,
    },

    /// The reference kind does not match the entity's kind.
    #[error("reference {reference} does not match entity kind {kind}")]
    KindMismatch {
        /// The supplied reference.
        reference: EntityReference,
        /// The entity's actual kind.
        kind: EntityKind,
    },
}

impl From<InventoryError> for MethodFault {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(reference) => Self::ManagedObjectNotFound { reference },
            other => Self::system(other.to_string()),
        }
    }
}

/// One structural edge whose target is missing from the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingEdge {
    /// Entity holding the edge.
    pub owner: EntityReference,
    /// Field name the edge lives in.
    pub field: &'static str,
    /// The missing target.
    pub target: EntityReference,
}

// =============================================================================
// Inventory
// =============================================================================

/// Graph store of all simulated entities.
///
/// # Determinism
///
/// Entities are kept in a `BTreeMap` so iteration is ordered by reference,
/// and identifiers are minted from a single monotonically increasing
/// counter, so building the same inventory twice yields identical
/// references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Next value of the identifier counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    #[serde(with = "entity_seq")]
    entities: BTreeMap<EntityReference, Entity>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes the entity map as a sequence; each entity carries its own key.
mod entity_seq {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};
    use vsim_types::EntityReference;

    use crate::entity::Entity;

    pub fn serialize<S: Serializer>(
        entities: &BTreeMap<EntityReference, Entity>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(entities.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EntityReference, Entity>, D::Error> {
        let entities = Vec::<Entity>::deserialize(deserializer)?;
        Ok(entities
            .into_iter()
            .map(|e| (e.reference().clone(), e))
            .collect())
    }
}

impl Inventory {
    /// Creates an empty inventory. The first minted identifier uses 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
        }
    }

    /// Creates an inventory holding only `root`, which receives the first
    /// minted identifier.
    #[must_use]
    pub fn with_root(mut root: Entity) -> (Self, EntityReference) {
        let mut inventory = Self::new();
        let reference = inventory.mint(root.kind());
        root.assign_reference(reference.clone());
        root.set_parent(None);
        inventory.entities.insert(reference.clone(), root);
        (inventory, reference)
    }

    /// Returns the entity stored under `reference`.
    #[must_use]
    pub fn get(&self, reference: &EntityReference) -> Option<&Entity> {
        self.entities.get(reference)
    }

    /// Returns the entity stored under `reference`, mutably. Edge lists stay
    /// behind the edge helpers.
    #[must_use]
    pub(crate) fn get_mut(&mut self, reference: &EntityReference) -> Option<&mut Entity> {
        self.entities.get_mut(reference)
    }

    /// Returns true if `reference` is present.
    #[must_use]
    pub fn contains(&self, reference: &EntityReference) -> bool {
        self.entities.contains_key(reference)
    }

    /// Inserts an entity and returns its reference.
    ///
    /// An unset reference is replaced by a fresh one built from the kind's
    /// identifier prefix and the counter.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::Duplicate`] if the reference is already taken
    /// - [`InventoryError::KindMismatch`] if an explicit reference names a
    ///   different kind than the entity's state
    pub fn put(&mut self, mut entity: Entity) -> Result<EntityReference, InventoryError> {
        let kind = entity.kind();

        if entity.reference().is_unset() {
            let reference = self.mint(kind);
            entity.assign_reference(reference);
        } else if entity.reference().known_kind() != Some(kind) {
            return Err(InventoryError::KindMismatch {
                reference: entity.reference().clone(),
                kind,
            });
        }

        let reference = entity.reference().clone();
        if self.entities.contains_key(&reference) {
            return Err(InventoryError::Duplicate(reference));
        }

        debug!(%reference, name = entity.name(), "inventory put");
        self.entities.insert(reference.clone(), entity);
        Ok(reference)
    }

    /// Inserts `entity` as a child of the folder `parent`.
    ///
    /// Sets the entity's parent link and appends it to the folder's child
    /// list. Nothing is inserted if the parent is missing, has no child
    /// list, or does not list the child's kind in its `child_type`.
    ///
    /// # Errors
    ///
    /// Any error of [`Inventory::put`], plus [`InventoryError::NotFound`] /
    /// [`InventoryError::NoSuchField`] for an unusable parent and
    /// [`InventoryError::ChildTypeRejected`] for a kind the folder does not
    /// hold.
    pub fn put_child(
        &mut self,
        parent: &EntityReference,
        mut entity: Entity,
    ) -> Result<EntityReference, InventoryError> {
        let folder = self
            .get(parent)
            .ok_or_else(|| InventoryError::NotFound(parent.clone()))?
            .as_folder()
            .ok_or_else(|| InventoryError::NoSuchField {
                owner: parent.clone(),
                field: RefList::ChildEntity,
            })?;
        if !folder.accepts(entity.kind()) {
            return Err(InventoryError::ChildTypeRejected {
                parent: parent.clone(),
                kind: entity.kind(),
            });
        }

        entity.set_parent(Some(parent.clone()));
        let reference = self.put(entity)?;
        self.add_reference(parent, RefList::ChildEntity, &reference)?;
        Ok(reference)
    }

    /// Removes one entity and returns it. Edges pointing at it are left in
    /// place.
    pub fn remove(&mut self, reference: &EntityReference) -> Option<Entity> {
        let removed = self.entities.remove(reference);
        if removed.is_some() {
            debug!(%reference, "inventory remove");
        }
        removed
    }

    /// Unlinks `child` from the folder `parent` and removes it.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NotFound`] / [`InventoryError::NoSuchField`] for an
    /// unusable parent. The child is removed even when it was not listed.
    pub fn remove_child(
        &mut self,
        parent: &EntityReference,
        child: &EntityReference,
    ) -> Result<Option<Entity>, InventoryError> {
        self.remove_reference(parent, RefList::ChildEntity, child)?;
        Ok(self.remove(child))
    }

    /// Appends `target` to the named list on `owner` unless already present.
    ///
    /// Returns whether the list changed. List order is preserved.
    ///
    /// # Errors
    ///
    /// [`InventoryError::NotFound`] if `owner` is missing,
    /// [`InventoryError::NoSuchField`] if its kind has no such list.
    pub fn add_reference(
        &mut self,
        owner: &EntityReference,
        field: RefList,
        target: &EntityReference,
    ) -> Result<bool, InventoryError> {
        let list = self.list_mut(owner, field)?;
        if list.contains(target) {
            return Ok(false);
        }
        list.push(target.clone());
        debug!(%owner, %field, %target, "reference added");
        Ok(true)
    }

    /// Removes `target` from the named list on `owner`.
    ///
    /// Returns whether the list changed. Remaining entries keep their order.
    ///
    /// # Errors
    ///
    /// Same as [`Inventory::add_reference`].
    pub fn remove_reference(
        &mut self,
        owner: &EntityReference,
        field: RefList,
        target: &EntityReference,
    ) -> Result<bool, InventoryError> {
        let list = self.list_mut(owner, field)?;
        let before = list.len();
        list.retain(|r| r != target);
        let changed = list.len() != before;
        if changed {
            debug!(%owner, %field, %target, "reference removed");
        }
        Ok(changed)
    }

    fn list_mut(
        &mut self,
        owner: &EntityReference,
        field: RefList,
    ) -> Result<&mut Vec<EntityReference>, InventoryError> {
        let entity = self
            .entities
            .get_mut(owner)
            .ok_or_else(|| InventoryError::NotFound(owner.clone()))?;
        entity
            .ref_list_mut(field)
            .ok_or_else(|| InventoryError::NoSuchField {
                owner: owner.clone(),
                field,
            })
    }

    /// Returns the first entity of `kind` in iteration order.
    #[must_use]
    pub fn any(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities.values().find(|e| e.kind() == kind)
    }

    /// Returns the first entity of `kind` named `name`.
    #[must_use]
    pub fn find_by_name(&self, kind: EntityKind, name: &str) -> Option<&Entity> {
        self.entities
            .values()
            .find(|e| e.kind() == kind && e.name() == name)
    }

    /// Returns all entities of `kind`, in iteration order.
    pub fn all_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(move |e| e.kind() == kind)
    }

    /// Returns the compute resource a host belongs to.
    ///
    /// That is the host's parent. `None` if the host is missing or
    /// parentless.
    #[must_use]
    pub fn host_parent(&self, host: &EntityReference) -> Option<&EntityReference> {
        self.get(host)?.parent()
    }

    /// Returns every `(owner, field)` whose edges point at `target`.
    #[must_use]
    pub fn referrers(&self, target: &EntityReference) -> Vec<(EntityReference, &'static str)> {
        self.entities
            .values()
            .flat_map(|entity| {
                entity
                    .edges()
                    .into_iter()
                    .filter(|(_, r)| *r == target)
                    .map(|(field, _)| (entity.reference().clone(), field))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Returns every structural edge whose target is missing.
    ///
    /// Empty whenever the graph is consistent.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingEdge> {
        self.entities
            .values()
            .flat_map(|entity| {
                entity
                    .edges()
                    .into_iter()
                    .filter(|(_, target)| !self.entities.contains_key(*target))
                    .map(|(field, target)| DanglingEdge {
                        owner: entity.reference().clone(),
                        field,
                        target: target.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Returns an iterator over entities in reference order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the inventory has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Next counter value whose reference is not taken by an explicit id.
    fn mint(&mut self, kind: EntityKind) -> EntityReference {
        loop {
            let reference =
                EntityReference::of(kind, format!("{}{}", kind.id_prefix(), self.next_id));
            self.next_id += 1;
            if !self.entities.contains_key(&reference) {
                return reference;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ComputeResourceState, DatastoreState, EntityInner, FolderState, HostState};
    use proptest::prelude::*;

    fn folder(name: &str) -> Entity {
        Entity::new(
            name,
            EntityInner::Folder(FolderState::accepting(["Folder", "HostSystem", "Datastore"])),
        )
    }

    fn host(name: &str) -> Entity {
        Entity::new(name, EntityInner::HostSystem(HostState::default()))
    }

    fn datastore(name: &str) -> Entity {
        Entity::new(name, EntityInner::Datastore(DatastoreState::backed_by("/tmp")))
    }

    mod put_tests {
        use super::*;

        #[test]
        fn new_creates_empty_inventory() {
            let inventory = Inventory::new();
            assert!(inventory.is_empty());
            assert_eq!(inventory.len(), 0);
        }

        #[test]
        fn put_assigns_prefixed_sequential_ids() {
            let mut inventory = Inventory::new();
            let f = inventory.put(folder("root")).unwrap();
            let h = inventory.put(host("h1")).unwrap();
            let d = inventory.put(datastore("ds1")).unwrap();

            assert_eq!(f, EntityReference::of(EntityKind::Folder, "group-d1"));
            assert_eq!(h, EntityReference::of(EntityKind::HostSystem, "host-2"));
            assert_eq!(d, EntityReference::of(EntityKind::Datastore, "datastore-3"));
        }

        #[test]
        fn put_keeps_explicit_reference() {
            let mut inventory = Inventory::new();
            let r = inventory.put(host("h1").with_id("host-99")).unwrap();
            assert_eq!(r.id(), "host-99");
            assert!(inventory.contains(&r));
        }

        #[test]
        fn put_rejects_duplicates() {
            let mut inventory = Inventory::new();
            inventory.put(host("h1").with_id("host-1")).unwrap();
            let err = inventory.put(host("h2").with_id("host-1")).unwrap_err();
            assert_eq!(
                err,
                InventoryError::Duplicate(EntityReference::of(EntityKind::HostSystem, "host-1"))
            );
            let kept = EntityReference::of(EntityKind::HostSystem, "host-1");
            assert_eq!(inventory.get(&kept).unwrap().name(), "h1");
        }

        #[test]
        fn minting_skips_explicitly_taken_ids() {
            let mut inventory = Inventory::new();
            let explicit = inventory.put(host("h1").with_id("host-1")).unwrap();
            let minted = inventory.put(host("h2")).unwrap();

            assert_ne!(minted, explicit);
            assert_eq!(minted, EntityReference::of(EntityKind::HostSystem, "host-2"));
            assert_eq!(inventory.get(&explicit).unwrap().name(), "h1");
            assert_eq!(inventory.get(&minted).unwrap().name(), "h2");
        }

        #[test]
        fn minting_skips_a_run_of_taken_ids() {
            let mut inventory = Inventory::new();
            for i in 1..=3 {
                inventory
                    .put(datastore(&format!("ds{i}")).with_id(format!("datastore-{i}")))
                    .unwrap();
            }
            let minted = inventory.put(datastore("fresh")).unwrap();
            assert_eq!(minted.id(), "datastore-4");
            assert_eq!(inventory.len(), 4);
        }

        #[test]
        fn put_child_links_both_directions() {
            let mut inventory = Inventory::new();
            let root = inventory.put(folder("root")).unwrap();
            let child = inventory.put_child(&root, folder("child")).unwrap();

            assert_eq!(inventory.get(&child).unwrap().parent(), Some(&root));
            assert_eq!(
                inventory.get(&root).unwrap().ref_list(RefList::ChildEntity).unwrap(),
                &[child]
            );
        }

        #[test]
        fn put_child_rejects_non_folder_parent() {
            let mut inventory = Inventory::new();
            let h = inventory.put(host("h1")).unwrap();
            let err = inventory.put_child(&h, folder("f")).unwrap_err();
            assert!(matches!(err, InventoryError::NoSuchField { .. }));
            assert_eq!(inventory.len(), 1);
        }

        #[test]
        fn put_child_enforces_child_type() {
            let mut inventory = Inventory::new();
            let hosts = inventory
                .put(Entity::new(
                    "host",
                    EntityInner::Folder(FolderState::accepting(["Folder", "ComputeResource"])),
                ))
                .unwrap();

            let err = inventory.put_child(&hosts, datastore("ds")).unwrap_err();
            assert_eq!(
                err,
                InventoryError::ChildTypeRejected {
                    parent: hosts.clone(),
                    kind: EntityKind::Datastore,
                }
            );
            assert_eq!(inventory.len(), 1);
            assert!(inventory
                .get(&hosts)
                .unwrap()
                .ref_list(RefList::ChildEntity)
                .unwrap()
                .is_empty());

            let cluster = Entity::new(
                "C0",
                EntityInner::ClusterComputeResource(ComputeResourceState::default()),
            );
            assert!(inventory.put_child(&hosts, cluster).is_ok());
        }
    }

    mod edge_tests {
        use super::*;

        #[test]
        fn add_reference_is_unique_and_ordered() {
            let mut inventory = Inventory::new();
            let h = inventory.put(host("h1")).unwrap();
            let a = inventory.put(datastore("a")).unwrap();
            let b = inventory.put(datastore("b")).unwrap();

            assert!(inventory.add_reference(&h, RefList::Datastore, &a).unwrap());
            assert!(inventory.add_reference(&h, RefList::Datastore, &b).unwrap());
            assert!(!inventory.add_reference(&h, RefList::Datastore, &a).unwrap());

            let list = inventory.get(&h).unwrap().ref_list(RefList::Datastore).unwrap();
            assert_eq!(list, &[a, b]);
        }

        #[test]
        fn remove_reference_preserves_order_of_the_rest() {
            let mut inventory = Inventory::new();
            let h = inventory.put(host("h1")).unwrap();
            let refs: Vec<_> = (0..3)
                .map(|i| inventory.put(datastore(&format!("ds{i}"))).unwrap())
                .collect();
            for r in &refs {
                inventory.add_reference(&h, RefList::Datastore, r).unwrap();
            }

            assert!(inventory.remove_reference(&h, RefList::Datastore, &refs[1]).unwrap());
            assert!(!inventory.remove_reference(&h, RefList::Datastore, &refs[1]).unwrap());

            let list = inventory.get(&h).unwrap().ref_list(RefList::Datastore).unwrap();
            assert_eq!(list, &[refs[0].clone(), refs[2].clone()]);
        }

        #[test]
        fn edge_helpers_report_missing_owner_and_field() {
            let mut inventory = Inventory::new();
            let ds = inventory.put(datastore("ds")).unwrap();
            let ghost = EntityReference::of(EntityKind::HostSystem, "host-404");

            assert_eq!(
                inventory.add_reference(&ghost, RefList::Datastore, &ds),
                Err(InventoryError::NotFound(ghost.clone()))
            );
            assert!(matches!(
                inventory.add_reference(&ds, RefList::ChildEntity, &ghost),
                Err(InventoryError::NoSuchField { .. })
            ));
        }

        #[test]
        fn remove_does_not_cascade() {
            let mut inventory = Inventory::new();
            let h = inventory.put(host("h1")).unwrap();
            let ds = inventory.put(datastore("ds")).unwrap();
            inventory.add_reference(&h, RefList::Datastore, &ds).unwrap();

            assert!(inventory.remove(&ds).is_some());

            let dangling = inventory.dangling_references();
            assert_eq!(dangling.len(), 1);
            assert_eq!(dangling[0].owner, h);
            assert_eq!(dangling[0].field, "datastore");
            assert_eq!(dangling[0].target, ds);
        }

        #[test]
        fn remove_child_unlinks_then_removes() {
            let mut inventory = Inventory::new();
            let root = inventory.put(folder("root")).unwrap();
            let child = inventory.put_child(&root, datastore("ds")).unwrap();

            let removed = inventory.remove_child(&root, &child).unwrap();
            assert_eq!(removed.unwrap().name(), "ds");
            assert!(inventory.dangling_references().is_empty());
            assert!(inventory.referrers(&child).is_empty());
        }

        #[test]
        fn referrers_lists_every_edge() {
            let mut inventory = Inventory::new();
            let root = inventory.put(folder("root")).unwrap();
            let h = inventory.put_child(&root, host("h1")).unwrap();
            let ds = inventory.put_child(&root, datastore("ds")).unwrap();
            inventory.add_reference(&h, RefList::Datastore, &ds).unwrap();
            inventory.add_reference(&ds, RefList::Host, &h).unwrap();

            let mut found = inventory.referrers(&ds);
            found.sort();
            assert_eq!(found, vec![(root, "childEntity"), (h, "datastore")]);
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn any_and_find_by_name() {
            let mut inventory = Inventory::new();
            inventory.put(host("h1")).unwrap();
            let h2 = inventory.put(host("h2")).unwrap();

            assert_eq!(inventory.any(EntityKind::HostSystem).unwrap().name(), "h1");
            assert!(inventory.any(EntityKind::Datastore).is_none());
            assert_eq!(
                inventory.find_by_name(EntityKind::HostSystem, "h2").unwrap().reference(),
                &h2
            );
            assert_eq!(inventory.all_of(EntityKind::HostSystem).count(), 2);
        }

        #[test]
        fn host_parent_is_the_parent_link() {
            let mut inventory = Inventory::new();
            let root = inventory.put(folder("root")).unwrap();
            let h = inventory.put_child(&root, host("h1")).unwrap();
            assert_eq!(inventory.host_parent(&h), Some(&root));
        }

        #[test]
        fn serialization_roundtrip() {
            let mut inventory = Inventory::new();
            let root = inventory.put(folder("root")).unwrap();
            inventory.put_child(&root, datastore("ds")).unwrap();

            let json = serde_json::to_string(&inventory).unwrap();
            let back: Inventory = serde_json::from_str(&json).unwrap();
            assert_eq!(back, inventory);
        }
    }

    proptest! {
        #[test]
        fn add_then_remove_all_edges_leaves_no_referrers(links in proptest::collection::vec((0usize..4, 0usize..4), 0..24)) {
            let mut inventory = Inventory::new();
            let hosts: Vec<_> = (0..4).map(|i| inventory.put(host(&format!("h{i}"))).unwrap()).collect();
            let stores: Vec<_> = (0..4).map(|i| inventory.put(datastore(&format!("d{i}"))).unwrap()).collect();

            for (h, d) in &links {
                inventory.add_reference(&hosts[*h], RefList::Datastore, &stores[*d]).unwrap();
                inventory.add_reference(&stores[*d], RefList::Host, &hosts[*h]).unwrap();
            }
            for list_owner in &hosts {
                let list = inventory.get(list_owner).unwrap().ref_list(RefList::Datastore).unwrap();
                let unique: std::collections::BTreeSet<_> = list.iter().collect();
                prop_assert_eq!(list.len(), unique.len());
            }

            let victim = &stores[0];
            for h in &hosts {
                inventory.remove_reference(h, RefList::Datastore, victim).unwrap();
            }
            inventory.remove(victim);

            prop_assert!(inventory.dangling_references().is_empty());
            prop_assert!(inventory.referrers(victim).is_empty());
        }
    }
}
