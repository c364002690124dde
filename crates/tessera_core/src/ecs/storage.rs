//! # Component Storage
//!
//! Pooled, index-addressed storage for a single component type.
//!
//! The storage uses a free-list strategy:
//! - Records live in a [`VectorPool`], one per (entity, component) pair
//! - Each record names its owning entity; each entity caches the record's
//!   slot index under the store's [`ComponentId`]
//! - Add, remove and lookup are O(1); traversal skips free slots
//!
//! ## Iterating while removing
//!
//! Traversal is cursor based ([`ComponentStore::begin`],
//! [`ComponentStore::advance`]). Removing the record under the cursor must go
//! through [`ComponentStore::remove_entity_at`] and continue from the cursor
//! it returns. Any other mutation during a traversal is memory-safe but
//! leaves it unspecified which records the pass visits.

use super::component::{Component, ComponentId, ComponentInterface};
use super::entity::{EntityId, EntityRegistry, UNUSED_COMPONENT_INDEX};
use super::manager::EntityManager;
use crate::memory::{PoolCursor, VectorPool};
use std::any::Any;

/// A record in a component store: the payload and its owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityData<T> {
    /// The entity this data belongs to. A weak handle: it may go stale.
    pub entity: EntityId,
    /// The component payload.
    pub data: T,
}

/// Storage for one component type.
///
/// # Type Parameters
///
/// * `C` - The component type; its [`Component::Data`] is stored per entity
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, ComponentStore, EntityManager};
///
/// struct Score;
///
/// impl Component for Score {
///     type Data = u64;
/// }
///
/// let mut manager = EntityManager::new();
/// manager.register_component(Score).unwrap();
///
/// let player = manager.allocate_new_entity();
/// *manager.add_component::<Score>(player).unwrap() += 10;
///
/// let scores: &ComponentStore<Score> = manager.component::<Score>().unwrap();
/// assert_eq!(scores.len(), 1);
/// assert_eq!(scores.entity_data(player, manager.entities()), Some(&10));
/// ```
pub struct ComponentStore<C: Component> {
    /// Pooled records.
    entity_data: VectorPool<EntityData<C::Data>>,
    /// The component value and its store-wide state.
    component: C,
    /// Id assigned at registration.
    component_id: ComponentId,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty store for `component` under `component_id`.
    #[must_use]
    pub fn new(component: C, component_id: ComponentId) -> Self {
        Self::with_capacity(component, component_id, 0)
    }

    /// Creates an empty store with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(component: C, component_id: ComponentId, capacity: usize) -> Self {
        Self {
            entity_data: VectorPool::with_capacity(capacity),
            component,
            component_id,
        }
    }

    /// Returns the id this store was registered under.
    #[inline]
    #[must_use]
    pub const fn component_id(&self) -> ComponentId {
        self.component_id
    }

    /// Returns the component value.
    #[inline]
    #[must_use]
    pub const fn component(&self) -> &C {
        &self.component
    }

    /// Returns the component value mutably.
    #[inline]
    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /// Returns the number of entities carrying this component.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entity_data.len()
    }

    /// Checks whether no entity carries this component.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entity_data.is_empty()
    }

    /// Returns the number of pool slots, occupied or free.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entity_data.slot_count()
    }

    /// Adds this component to `entity` and returns its data.
    ///
    /// If the entity already has it, the existing data is returned untouched
    /// and no hook runs. Otherwise default data is created, the entity's
    /// index table is updated, and then [`Component::init_entity`] runs.
    ///
    /// Returns `None` if `entity` is not alive.
    pub fn add_entity(
        &mut self,
        entity: EntityId,
        manager: &mut EntityManager,
    ) -> Option<&mut C::Data> {
        let owner = manager.entities_mut().get_mut(entity)?;
        let existing = owner.component_data_index(self.component_id);
        if existing != UNUSED_COMPONENT_INDEX {
            return self.data_at_mut(existing);
        }

        let index = self.entity_data.allocate(EntityData {
            entity,
            data: C::Data::default(),
        });
        owner.set_component_data_index(self.component_id, index);
        tracing::trace!("Added {} to {} at slot {}", self.name(), entity, index);

        let record = self.entity_data.get_mut(index)?;
        self.component.init_entity(entity, &mut record.data, manager);
        self.data_at_mut(index)
    }

    /// Removes this component from `entity`.
    ///
    /// Runs [`Component::cleanup_entity`], frees the slot and resets the
    /// entity's cached index.
    ///
    /// # Panics
    ///
    /// Panics if `entity` does not carry this component.
    pub fn remove_entity(&mut self, entity: EntityId, manager: &mut EntityManager) {
        let index = manager
            .entities()
            .get(entity)
            .map_or(UNUSED_COMPONENT_INDEX, |owner| {
                owner.component_data_index(self.component_id)
            });
        assert!(
            self.entity_data
                .get(index)
                .is_some_and(|record| record.entity == entity),
            "cannot remove {} from {}: entity is not registered for it",
            self.name(),
            entity
        );

        self.cleanup_record(index, manager);
        self.entity_data.free(index);
        Self::unlink(self.component_id, entity, index, manager);
    }

    /// Removes the record under `cursor` and returns the cursor of the next
    /// record.
    ///
    /// Runs the same hook as [`ComponentStore::remove_entity`]. Works for
    /// records whose entity has already been destroyed.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is the end cursor or its slot is empty.
    pub fn remove_entity_at(&mut self, cursor: PoolCursor, manager: &mut EntityManager) -> PoolCursor {
        let Some(index) = cursor.index() else {
            panic!("cannot remove {} through the end cursor", self.name());
        };
        let entity = self.cleanup_record(index, manager);
        let next = self.entity_data.free_at(cursor);
        Self::unlink(self.component_id, entity, index, manager);
        next
    }

    /// Removes every record, running the cleanup hook once per record.
    pub fn clear_entity_data(&mut self, manager: &mut EntityManager) {
        let mut cursor = self.begin();
        while !cursor.is_end() {
            cursor = self.remove_entity_at(cursor, manager);
        }
    }

    /// Gets the data of `entity`.
    ///
    /// Returns `None` if the entity is dead or has no such component.
    #[must_use]
    pub fn entity_data(&self, entity: EntityId, entities: &EntityRegistry) -> Option<&C::Data> {
        let index = entities.get(entity)?.component_data_index(self.component_id);
        self.entity_data
            .get(index)
            .filter(|record| record.entity == entity)
            .map(|record| &record.data)
    }

    /// Gets the data of `entity` mutably.
    ///
    /// Returns `None` if the entity is dead or has no such component.
    pub fn entity_data_mut(
        &mut self,
        entity: EntityId,
        entities: &EntityRegistry,
    ) -> Option<&mut C::Data> {
        let index = entities.get(entity)?.component_data_index(self.component_id);
        self.entity_data
            .get_mut(index)
            .filter(|record| record.entity == entity)
            .map(|record| &mut record.data)
    }

    /// Gets the data stored at slot `index`.
    ///
    /// Returns `None` if the slot is out of range or empty.
    #[inline]
    #[must_use]
    pub fn data_at(&self, index: usize) -> Option<&C::Data> {
        self.entity_data.get(index).map(|record| &record.data)
    }

    /// Gets the data stored at slot `index` mutably.
    #[inline]
    pub fn data_at_mut(&mut self, index: usize) -> Option<&mut C::Data> {
        self.entity_data.get_mut(index).map(|record| &mut record.data)
    }

    /// Gets the whole record stored at slot `index`.
    #[inline]
    #[must_use]
    pub fn record_at(&self, index: usize) -> Option<&EntityData<C::Data>> {
        self.entity_data.get(index)
    }

    /// Gets the owner and the data stored at slot `index`, the data mutably.
    #[inline]
    pub fn record_at_mut(&mut self, index: usize) -> Option<(EntityId, &mut C::Data)> {
        self.entity_data
            .get_mut(index)
            .map(|record| (record.entity, &mut record.data))
    }

    /// Returns a cursor at the first record.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> PoolCursor {
        self.entity_data.begin()
    }

    /// Returns the past-the-end cursor.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> PoolCursor {
        self.entity_data.end()
    }

    /// Moves `cursor` to the next record.
    #[inline]
    #[must_use]
    pub fn advance(&self, cursor: PoolCursor) -> PoolCursor {
        self.entity_data.advance(cursor)
    }

    /// Iterates over `(owner, data)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C::Data)> {
        self.entity_data
            .iter()
            .map(|(_, record)| (record.entity, &record.data))
    }

    /// Iterates mutably over `(owner, data)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C::Data)> {
        self.entity_data
            .iter_mut()
            .map(|(_, record)| (record.entity, &mut record.data))
    }

    /// Runs the per-frame update, [`Component::update_all`].
    pub fn update_all_entities(&mut self, manager: &mut EntityManager, delta_time: f32) {
        C::update_all(self, manager, delta_time);
    }

    /// Runs the store-wide init hook.
    pub fn init(&mut self) {
        self.component.init();
    }

    /// Runs the store-wide cleanup hook.
    pub fn cleanup(&mut self) {
        self.component.cleanup();
    }

    /// Runs the cleanup hook for slot `index` and returns its owner.
    fn cleanup_record(&mut self, index: usize, manager: &mut EntityManager) -> EntityId {
        let name = self.name();
        let Some(record) = self.entity_data.get_mut(index) else {
            panic!("cannot remove {name}: slot {index} is empty");
        };
        let entity = record.entity;
        self.component
            .cleanup_entity(entity, &mut record.data, manager);
        tracing::trace!("Removed {} from {} at slot {}", name, entity, index);
        entity
    }

    /// Resets the owner's cached index if it still points at `index`.
    fn unlink(component_id: ComponentId, entity: EntityId, index: usize, manager: &mut EntityManager) {
        if let Some(owner) = manager.entities_mut().get_mut(entity) {
            if owner.component_data_index(component_id) == index {
                owner.set_component_data_index(component_id, UNUSED_COMPONENT_INDEX);
            }
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        std::any::type_name::<C>()
    }
}

impl<C: Component> ComponentInterface for ComponentStore<C> {
    fn component_id(&self) -> ComponentId {
        self.component_id
    }

    fn component_name(&self) -> &'static str {
        self.name()
    }

    fn len(&self) -> usize {
        self.entity_data.len()
    }

    fn add_entity_generically(&mut self, entity: EntityId, manager: &mut EntityManager) -> bool {
        self.add_entity(entity, manager).is_some()
    }

    fn remove_entity(&mut self, entity: EntityId, manager: &mut EntityManager) {
        Self::remove_entity(self, entity, manager);
    }

    fn clear_entity_data(&mut self, manager: &mut EntityManager) {
        Self::clear_entity_data(self, manager);
    }

    fn update_all_entities(&mut self, manager: &mut EntityManager, delta_time: f32) {
        Self::update_all_entities(self, manager, delta_time);
    }

    fn init(&mut self) {
        Self::init(self);
    }

    fn cleanup(&mut self) {
        Self::cleanup(self);
    }

    fn entity_data_as_any(&self, entity: EntityId, entities: &EntityRegistry) -> Option<&dyn Any> {
        self.entity_data(entity, entities)
            .map(|data| data as &dyn Any)
    }

    fn entity_data_as_any_mut(
        &mut self,
        entity: EntityId,
        entities: &EntityRegistry,
    ) -> Option<&mut dyn Any> {
        self.entity_data_mut(entity, entities)
            .map(|data| data as &mut dyn Any)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts hook invocations and stamps each payload with a serial.
    #[derive(Default)]
    struct Tracker {
        inits: usize,
        cleanups: usize,
        next_serial: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tag {
        serial: u32,
        touched: bool,
    }

    impl Component for Tracker {
        type Data = Tag;

        fn init_entity(&mut self, _entity: EntityId, data: &mut Tag, _manager: &mut EntityManager) {
            self.inits += 1;
            self.next_serial += 1;
            data.serial = self.next_serial;
        }

        fn cleanup_entity(&mut self, _entity: EntityId, _data: &mut Tag, _manager: &mut EntityManager) {
            self.cleanups += 1;
        }
    }

    fn setup(count: usize) -> (EntityManager, ComponentStore<Tracker>, Vec<EntityId>) {
        let mut manager = EntityManager::new();
        let entities = (0..count).map(|_| manager.allocate_new_entity()).collect();
        let store = ComponentStore::new(Tracker::default(), ComponentId::from_index(0));
        (manager, store, entities)
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut manager, mut store, entities) = setup(1);
        let e = entities[0];

        store.add_entity(e, &mut manager).unwrap().touched = true;
        let again = store.add_entity(e, &mut manager).unwrap();
        assert!(again.touched);
        assert_eq!(again.serial, 1);

        assert_eq!(store.len(), 1);
        assert_eq!(store.component().inits, 1);
    }

    #[test]
    fn test_add_wires_entity_index() {
        let (mut manager, mut store, entities) = setup(2);
        store.add_entity(entities[0], &mut manager);
        store.add_entity(entities[1], &mut manager);

        let owner = manager.entities().get(entities[1]).unwrap();
        let index = owner.component_data_index(store.component_id());
        assert_eq!(store.record_at(index).unwrap().entity, entities[1]);
        assert_eq!(store.data_at(index).unwrap().serial, 2);
    }

    #[test]
    fn test_add_remove_round_trip() {
        let (mut manager, mut store, entities) = setup(2);
        store.add_entity(entities[0], &mut manager);
        let before = store.len();

        store.add_entity(entities[1], &mut manager);
        store.remove_entity(entities[1], &mut manager);

        assert_eq!(store.len(), before);
        assert!(store.entity_data(entities[1], manager.entities()).is_none());
        assert!(!manager
            .entities()
            .get(entities[1])
            .unwrap()
            .is_registered_for_component(store.component_id()));
        assert_eq!(store.component().cleanups, 1);
    }

    #[test]
    fn test_unrelated_removal_keeps_data() {
        let (mut manager, mut store, entities) = setup(2);
        store.add_entity(entities[0], &mut manager).unwrap().touched = true;
        store.add_entity(entities[1], &mut manager);

        store.remove_entity(entities[1], &mut manager);

        let data = store.entity_data(entities[0], manager.entities()).unwrap();
        assert_eq!(*data, Tag { serial: 1, touched: true });
    }

    #[test]
    fn test_slot_reuse_has_no_residue() {
        let (mut manager, mut store, entities) = setup(2);
        store.add_entity(entities[0], &mut manager).unwrap().touched = true;
        let old_index = manager
            .entities()
            .get(entities[0])
            .unwrap()
            .component_data_index(store.component_id());
        store.remove_entity(entities[0], &mut manager);

        store.add_entity(entities[1], &mut manager);
        let new_index = manager
            .entities()
            .get(entities[1])
            .unwrap()
            .component_data_index(store.component_id());

        assert_eq!(old_index, new_index);
        let record = store.record_at(new_index).unwrap();
        assert_eq!(record.entity, entities[1]);
        assert!(!record.data.touched);
        assert_eq!(record.data.serial, 2);
    }

    #[test]
    fn test_lookup_absent_is_none() {
        let (manager, store, entities) = setup(1);
        assert!(store.entity_data(entities[0], manager.entities()).is_none());
        assert!(store.entity_data(EntityId::NULL, manager.entities()).is_none());
        assert!(store.data_at(0).is_none());
        assert!(store.data_at(UNUSED_COMPONENT_INDEX).is_none());
    }

    #[test]
    fn test_add_to_dead_entity_is_none() {
        let (mut manager, mut store, entities) = setup(1);
        manager.delete_entity(entities[0]);
        manager.delete_marked_entities();

        assert!(store.add_entity(entities[0], &mut manager).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_iteration_visits_every_record_once() {
        let (mut manager, mut store, entities) = setup(10);
        for e in &entities {
            store.add_entity(*e, &mut manager);
        }

        let visited: Vec<EntityId> = store.iter().map(|(e, _)| e).collect();
        assert_eq!(visited, entities);
    }

    #[test]
    fn test_remove_at_every_position() {
        for victim in 0..4 {
            let (mut manager, mut store, entities) = setup(4);
            for e in &entities {
                store.add_entity(*e, &mut manager);
            }

            let mut visited = Vec::new();
            let mut cursor = store.begin();
            while let Some(index) = cursor.index() {
                let owner = store.record_at(index).unwrap().entity;
                visited.push(owner);
                cursor = if owner == entities[victim] {
                    store.remove_entity_at(cursor, &mut manager)
                } else {
                    store.advance(cursor)
                };
            }

            assert_eq!(visited, entities);
            let remaining: Vec<EntityId> = store.iter().map(|(e, _)| e).collect();
            let expected: Vec<EntityId> = entities
                .iter()
                .copied()
                .filter(|e| *e != entities[victim])
                .collect();
            assert_eq!(remaining, expected);
            assert!(store.entity_data(entities[victim], manager.entities()).is_none());
        }
    }

    #[test]
    fn test_record_at_mut_exposes_owner_by_value() {
        let (mut manager, mut store, entities) = setup(2);
        store.add_entity(entities[0], &mut manager);
        store.add_entity(entities[1], &mut manager);

        let (owner, data) = store.record_at_mut(1).unwrap();
        assert_eq!(owner, entities[1]);
        data.touched = true;

        assert!(store.entity_data(entities[1], manager.entities()).unwrap().touched);
        assert_eq!(store.record_at(1).unwrap().entity, entities[1]);
        assert!(store.record_at_mut(5).is_none());
    }

    #[test]
    fn test_remove_at_only_element() {
        let (mut manager, mut store, entities) = setup(1);
        store.add_entity(entities[0], &mut manager);

        let next = store.remove_entity_at(store.begin(), &mut manager);
        assert_eq!(next, store.end());
        assert!(store.is_empty());
        assert_eq!(store.component().cleanups, 1);
    }

    #[test]
    fn test_clear_runs_cleanup_per_entity() {
        let (mut manager, mut store, entities) = setup(5);
        for e in &entities {
            store.add_entity(*e, &mut manager);
        }

        store.clear_entity_data(&mut manager);
        assert!(store.is_empty());
        assert_eq!(store.component().cleanups, 5);

        // Re-adding behaves like a fresh add.
        store.add_entity(entities[0], &mut manager);
        assert_eq!(store.component().inits, 6);
        assert_eq!(store.len(), 1);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_remove_unregistered_panics() {
        let (mut manager, mut store, entities) = setup(1);
        store.remove_entity(entities[0], &mut manager);
    }

    #[test]
    fn test_type_erased_access() {
        let (mut manager, mut store, entities) = setup(1);
        assert!(ComponentInterface::add_entity_generically(&mut store, entities[0], &mut manager));

        let erased: &dyn ComponentInterface = &store;
        assert_eq!(ComponentInterface::len(erased), 1);
        let data = erased
            .entity_data_as_any(entities[0], manager.entities())
            .and_then(|any| any.downcast_ref::<Tag>())
            .unwrap();
        assert_eq!(data.serial, 1);
        assert!(erased
            .as_any()
            .downcast_ref::<ComponentStore<Tracker>>()
            .is_some());
    }
}
