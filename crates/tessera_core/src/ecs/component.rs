//! # Component System
//!
//! A component type is a payload shape plus optional lifecycle hooks.
//! The generic [`ComponentStore`] owns the pooling; implementors only
//! describe what their data looks like and what to do when it appears,
//! disappears or ticks.

use super::entity::{EntityId, EntityRegistry};
use super::manager::EntityManager;
use super::storage::ComponentStore;
use std::any::Any;

/// Identifier of a registered component type.
///
/// Ids are dense small integers handed out by the
/// [`EntityManager`] in registration order and never reused for another
/// type while the manager lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Id that no registered component ever receives.
    pub const INVALID: Self = Self(u32::MAX);

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks whether this id can name a component.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Builds an id from a table index. The manager guarantees the index
    /// fits.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// A component type: the per-entity payload and its lifecycle hooks.
///
/// The implementing value itself is stored once per store and can hold
/// component-wide state (gravity, counters, lookup tables). Every hook
/// defaults to a no-op.
///
/// Per-entity hooks receive the manager so they can reach sibling
/// components on the same entity. While a hook runs, its own store is
/// checked out of the manager: reaching it through the manager again is a
/// re-entrancy bug and panics.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, EntityId, EntityManager};
///
/// #[derive(Default)]
/// struct Health {
///     spawned: u32,
/// }
///
/// impl Component for Health {
///     type Data = i32;
///
///     fn init_entity(&mut self, _entity: EntityId, data: &mut i32, _manager: &mut EntityManager) {
///         *data = 100;
///         self.spawned += 1;
///     }
/// }
///
/// let mut manager = EntityManager::new();
/// manager.register_component(Health::default()).unwrap();
///
/// let hero = manager.allocate_new_entity();
/// assert_eq!(manager.add_component::<Health>(hero).copied(), Some(100));
/// ```
pub trait Component: Sized + 'static {
    /// Data stored for every entity carrying this component.
    type Data: Default + 'static;

    /// Runs once when the store is registered, before any entity is added.
    fn init(&mut self) {}

    /// Runs once when the manager shuts down, after every entity was removed.
    fn cleanup(&mut self) {}

    /// Runs after `data` was default-constructed for `entity` and the
    /// entity's index table already points at it.
    fn init_entity(&mut self, _entity: EntityId, _data: &mut Self::Data, _manager: &mut EntityManager) {}

    /// Runs before `data` is dropped and its slot freed.
    fn cleanup_entity(
        &mut self,
        _entity: EntityId,
        _data: &mut Self::Data,
        _manager: &mut EntityManager,
    ) {
    }

    /// Per-frame update over the whole store.
    ///
    /// Implementations that remove entities while traversing must use
    /// [`ComponentStore::remove_entity_at`] and continue from the cursor it
    /// returns.
    fn update_all(_store: &mut ComponentStore<Self>, _manager: &mut EntityManager, _delta_time: f32) {}
}

/// Type-erased view of a component store.
///
/// Lets the manager drive every store without knowing its payload type.
/// Implemented by every [`ComponentStore`].
pub trait ComponentInterface: Any {
    /// Id assigned at registration.
    fn component_id(&self) -> ComponentId;

    /// Rust type name of the component, for diagnostics.
    fn component_name(&self) -> &'static str;

    /// Number of entities carrying this component.
    fn len(&self) -> usize;

    /// Checks whether no entity carries this component.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds the component with default data.
    ///
    /// Returns `false` if `entity` is not alive.
    fn add_entity_generically(&mut self, entity: EntityId, manager: &mut EntityManager) -> bool;

    /// Removes the component from `entity`, running its cleanup hook.
    fn remove_entity(&mut self, entity: EntityId, manager: &mut EntityManager);

    /// Removes every entity, running the cleanup hook once per entity.
    fn clear_entity_data(&mut self, manager: &mut EntityManager);

    /// Runs the per-frame update.
    fn update_all_entities(&mut self, manager: &mut EntityManager, delta_time: f32);

    /// Runs the store-wide init hook.
    fn init(&mut self);

    /// Runs the store-wide cleanup hook.
    fn cleanup(&mut self);

    /// Returns the payload for `entity` as `Any`, or `None` if absent.
    fn entity_data_as_any(&self, entity: EntityId, entities: &EntityRegistry) -> Option<&dyn Any>;

    /// Returns the payload for `entity` as mutable `Any`, or `None` if absent.
    fn entity_data_as_any_mut(
        &mut self,
        entity: EntityId,
        entities: &EntityRegistry,
    ) -> Option<&mut dyn Any>;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
