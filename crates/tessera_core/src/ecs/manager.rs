//! # Entity Manager
//!
//! The central container for entities and component stores.
//!
//! The manager hands out component ids, owns one store per component type,
//! and routes every add/remove/lookup to the right store. While a store
//! operation runs, that store is checked out of the manager so its hooks can
//! receive `&mut EntityManager` and reach sibling components.

use super::component::{Component, ComponentId, ComponentInterface};
use super::entity::{EntityId, EntityRegistry};
use super::storage::ComponentStore;
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};
use std::any::{type_name, TypeId};
use std::collections::HashMap;

/// Owner of all entities and component stores.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, EntityManager};
///
/// struct Name;
///
/// impl Component for Name {
///     type Data = String;
/// }
///
/// let mut manager = EntityManager::new();
/// let name_id = manager.register_component(Name).unwrap();
///
/// let entity = manager.allocate_new_entity();
/// manager.add_component::<Name>(entity).unwrap().push_str("crate");
///
/// let name = manager.get_component_data::<String>(entity, name_id);
/// assert_eq!(name.map(String::as_str), Some("crate"));
///
/// manager.delete_entity(entity);
/// manager.update_components(0.016);
/// assert!(!manager.is_alive(entity));
/// ```
pub struct EntityManager {
    /// All entities.
    entities: EntityRegistry,
    /// Stores indexed by component id. `None` while a store is checked out.
    components: Vec<Option<Box<dyn ComponentInterface>>>,
    /// Type names indexed by component id, for diagnostics.
    component_names: Vec<&'static str>,
    /// Component id per registered Rust type.
    type_ids: HashMap<TypeId, ComponentId>,
    /// Entities waiting for the next deletion sweep.
    marked_for_deletion: Vec<EntityId>,
    /// Sizing configuration.
    config: EcsConfig,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(EcsConfig::default())
    }

    /// Creates a manager with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn with_config(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EcsConfig) -> Self {
        Self {
            entities: EntityRegistry::with_capacity(config.initial_entity_capacity),
            components: Vec::new(),
            component_names: Vec::new(),
            type_ids: HashMap::new(),
            marked_for_deletion: Vec::new(),
            config,
        }
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    // =========================================================================
    // Component registration
    // =========================================================================

    /// Registers a component type and returns its id.
    ///
    /// Ids are assigned densely in registration order. The store-wide
    /// [`Component::init`] hook runs before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if `C` is already registered,
    /// and [`EcsError::TooManyComponents`] if the configured limit is reached.
    pub fn register_component<C: Component>(&mut self, component: C) -> EcsResult<ComponentId> {
        let name = type_name::<C>();
        if self.type_ids.contains_key(&TypeId::of::<C>()) {
            return Err(EcsError::DuplicateComponent(name));
        }
        if self.components.len() >= self.config.max_component_types {
            return Err(EcsError::TooManyComponents {
                max: self.config.max_component_types,
                name,
            });
        }

        let id = ComponentId::from_index(self.components.len());
        let mut store = ComponentStore::with_capacity(component, id, self.config.initial_pool_capacity);
        store.init();

        self.components.push(Some(Box::new(store)));
        self.component_names.push(name);
        self.type_ids.insert(TypeId::of::<C>(), id);

        tracing::debug!("Registered component {} as {}", name, id);
        Ok(id)
    }

    /// Returns the id of component type `C`, if registered.
    #[inline]
    #[must_use]
    pub fn component_id<C: Component>(&self) -> Option<ComponentId> {
        self.type_ids.get(&TypeId::of::<C>()).copied()
    }

    /// Returns the number of registered component types.
    #[inline]
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    pub fn component_name(&self, id: ComponentId) -> Option<&'static str> {
        self.component_names.get(id.index()).copied()
    }

    /// Returns the typed store of component `C`.
    ///
    /// Returns `None` if `C` is not registered or its store is checked out.
    #[must_use]
    pub fn component<C: Component>(&self) -> Option<&ComponentStore<C>> {
        let id = self.component_id::<C>()?;
        self.components
            .get(id.index())?
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentStore<C>>()
    }

    /// Returns the typed store of component `C` mutably.
    ///
    /// Returns `None` if `C` is not registered or its store is checked out.
    pub fn component_mut<C: Component>(&mut self) -> Option<&mut ComponentStore<C>> {
        let id = self.component_id::<C>()?;
        self.components
            .get_mut(id.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentStore<C>>()
    }

    /// Returns the type-erased store registered under `id`.
    ///
    /// Returns `None` if `id` is unknown or the store is checked out.
    #[must_use]
    pub fn component_by_id(&self, id: ComponentId) -> Option<&dyn ComponentInterface> {
        self.components.get(id.index())?.as_deref()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Returns the entity registry.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    #[inline]
    pub(crate) fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    /// Creates a new entity with no components.
    pub fn allocate_new_entity(&mut self) -> EntityId {
        let entity = self.entities.spawn();
        tracing::trace!("Spawned {}", entity);
        entity
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of alive entities.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Marks an entity for deletion at the next sweep.
    ///
    /// The entity and its data stay fully usable until
    /// [`EntityManager::delete_marked_entities`] runs, which
    /// [`EntityManager::update_components`] does at the end of every frame.
    /// Marking a dead entity, or marking twice, is harmless.
    pub fn delete_entity(&mut self, entity: EntityId) {
        if self.entities.is_alive(entity) {
            self.marked_for_deletion.push(entity);
        }
    }

    /// Returns the number of entities waiting for deletion.
    #[inline]
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.marked_for_deletion.len()
    }

    /// Removes every component from each marked entity, then destroys it.
    ///
    /// Cleanup hooks may mark further entities; those are swept in the same
    /// call. Components a cleanup hook adds to the dying entity are removed
    /// as well, so hooks must not keep re-adding each other.
    pub fn delete_marked_entities(&mut self) {
        let mut deleted = 0_usize;
        while !self.marked_for_deletion.is_empty() {
            let batch = std::mem::take(&mut self.marked_for_deletion);
            for entity in batch {
                if self.destroy_entity(entity) {
                    deleted += 1;
                }
            }
        }
        if deleted > 0 {
            tracing::debug!("Deleted {} marked entities", deleted);
        }
    }

    fn destroy_entity(&mut self, entity: EntityId) -> bool {
        // Cleanup hooks may add or remove siblings, so re-read the table
        // after every removal until it is empty.
        loop {
            let Some(record) = self.entities.get(entity) else {
                return false;
            };
            let Some(id) = record.registered_components().next() else {
                break;
            };
            self.remove_component_by_id(entity, id);
        }
        let despawned = self.entities.despawn(entity);
        tracing::trace!("Despawned {}", entity);
        despawned
    }

    // =========================================================================
    // Component data
    // =========================================================================

    /// Adds component `C` to `entity` and returns its data.
    ///
    /// Idempotent: an entity that already has `C` gets its existing data.
    /// Returns `None` if `entity` is not alive.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered, or if called from a hook of `C`.
    pub fn add_component<C: Component>(&mut self, entity: EntityId) -> Option<&mut C::Data> {
        let added = self.with_component::<C, _>(|store, manager| {
            store.add_entity(entity, manager).is_some()
        });
        if !added {
            return None;
        }
        self.component_data_mut::<C>(entity)
    }

    /// Adds the component registered under `id` with default data.
    ///
    /// Returns `false` if `entity` is not alive.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered, or if called from a hook of that
    /// component.
    pub fn add_component_by_id(&mut self, entity: EntityId, id: ComponentId) -> bool {
        self.with_store(id, |store, manager| store.add_entity_generically(entity, manager))
    }

    /// Removes component `C` from `entity`, running its cleanup hook.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered, if `entity` does not carry it, or if
    /// called from a hook of `C`.
    pub fn remove_component<C: Component>(&mut self, entity: EntityId) {
        self.with_component::<C, _>(|store, manager| store.remove_entity(entity, manager));
    }

    /// Removes the component registered under `id` from `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered, if `entity` does not carry it, or
    /// if called from a hook of that component.
    pub fn remove_component_by_id(&mut self, entity: EntityId, id: ComponentId) {
        self.with_store(id, |store, manager| store.remove_entity(entity, manager));
    }

    /// Checks whether `entity` carries component `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: EntityId) -> bool {
        let Some(id) = self.component_id::<C>() else {
            return false;
        };
        self.entities
            .get(entity)
            .is_some_and(|e| e.is_registered_for_component(id))
    }

    /// Gets the data of component `C` on `entity`.
    ///
    /// Returns `None` if the entity is dead or lacks the component.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    #[must_use]
    pub fn component_data<C: Component>(&self, entity: EntityId) -> Option<&C::Data> {
        let id = self.expect_component_id::<C>();
        self.get_component_data::<C::Data>(entity, id)
    }

    /// Gets the data of component `C` on `entity` mutably.
    ///
    /// Returns `None` if the entity is dead or lacks the component.
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered.
    pub fn component_data_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C::Data> {
        let id = self.expect_component_id::<C>();
        self.get_component_data_mut::<C::Data>(entity, id)
    }

    /// Gets the data stored for `entity` by the component registered under
    /// `id`, as type `D`.
    ///
    /// Returns `None` if the data is absent, the store is checked out, or
    /// `D` is not the store's payload type.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    #[must_use]
    pub fn get_component_data<D: 'static>(&self, entity: EntityId, id: ComponentId) -> Option<&D> {
        let Some(slot) = self.components.get(id.index()) else {
            panic!("{id} is not a registered component");
        };
        slot.as_deref()?
            .entity_data_as_any(entity, &self.entities)?
            .downcast_ref::<D>()
    }

    /// Mutable form of [`EntityManager::get_component_data`].
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn get_component_data_mut<D: 'static>(
        &mut self,
        entity: EntityId,
        id: ComponentId,
    ) -> Option<&mut D> {
        let Some(slot) = self.components.get_mut(id.index()) else {
            panic!("{id} is not a registered component");
        };
        slot.as_deref_mut()?
            .entity_data_as_any_mut(entity, &self.entities)?
            .downcast_mut::<D>()
    }

    // =========================================================================
    // Frame and lifecycle
    // =========================================================================

    /// Runs every store's per-frame update in registration order, then
    /// sweeps entities marked for deletion.
    pub fn update_components(&mut self, delta_time: f32) {
        for index in 0..self.components.len() {
            self.with_store(ComponentId::from_index(index), |store, manager| {
                store.update_all_entities(manager, delta_time);
            });
        }
        self.delete_marked_entities();
    }

    /// Removes every component from every entity, running cleanup hooks.
    ///
    /// Entities stay alive.
    pub fn clear_components(&mut self) {
        for index in 0..self.components.len() {
            self.with_store(ComponentId::from_index(index), |store, manager| {
                store.clear_entity_data(manager);
            });
        }
    }

    /// Tears the manager down.
    ///
    /// Sweeps pending deletions, clears every store (running per-entity
    /// cleanup hooks), then runs each store-wide [`Component::cleanup`] hook
    /// once.
    pub fn shutdown(mut self) {
        self.delete_marked_entities();
        self.clear_components();
        for store in self.components.iter_mut().flatten() {
            store.cleanup();
        }
        tracing::debug!(
            "Shut down {} component stores, {} entities remain",
            self.components.len(),
            self.entities.alive_count()
        );
    }

    // =========================================================================
    // Store checkout
    // =========================================================================

    /// Checks out the store registered under `id` for the duration of `f`.
    ///
    /// The store goes back into its slot even if `f` unwinds.
    fn with_store<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut Box<dyn ComponentInterface>, &mut Self) -> R,
    ) -> R {
        let Some(slot) = self.components.get_mut(id.index()) else {
            panic!("{id} is not a registered component");
        };
        let Some(store) = slot.take() else {
            panic!(
                "{} is already in use: a hook re-entered its own store",
                self.component_names[id.index()]
            );
        };

        let mut checkout = StoreCheckout {
            manager: self,
            index: id.index(),
            store: Some(store),
        };
        let StoreCheckout { manager, store, .. } = &mut checkout;
        let Some(store) = store.as_mut() else {
            unreachable!("{id} was checked out above");
        };
        f(store, &mut **manager)
    }

    /// Checks out the store of component `C` for the duration of `f`.
    ///
    /// This is how code outside a component's own hooks gets the store and
    /// the manager at the same time, for example to traverse with cursors
    /// and call [`ComponentStore::remove_entity_at`].
    ///
    /// # Panics
    ///
    /// Panics if `C` is not registered or its store is already checked out.
    pub fn with_component<C: Component, R>(
        &mut self,
        f: impl FnOnce(&mut ComponentStore<C>, &mut Self) -> R,
    ) -> R {
        let id = self.expect_component_id::<C>();
        self.with_store(id, |store, manager| {
            let Some(store) = store.as_any_mut().downcast_mut::<ComponentStore<C>>() else {
                unreachable!("{id} does not hold a {} store", type_name::<C>());
            };
            f(store, manager)
        })
    }

    fn expect_component_id<C: Component>(&self) -> ComponentId {
        match self.component_id::<C>() {
            Some(id) => id,
            None => panic!("component {} is not registered", type_name::<C>()),
        }
    }
}

/// Puts a checked-out store back into its slot when dropped.
struct StoreCheckout<'a> {
    manager: &'a mut EntityManager,
    index: usize,
    store: Option<Box<dyn ComponentInterface>>,
}

impl Drop for StoreCheckout<'_> {
    fn drop(&mut self) {
        if let Some(store) = self.store.take() {
            self.manager.components[self.index] = Some(store);
        }
    }
}
