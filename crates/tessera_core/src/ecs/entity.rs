//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the entity arena
//! - A generation counter for safe reuse
//!
//! Each live entity carries a small table mapping component ids to slot
//! indices in the matching component store. That table is the only link
//! from an entity to its data; stores link back through [`EntityId`].

use super::component::ComponentId;

/// Slot index meaning "no component of this type".
pub const UNUSED_COMPONENT_INDEX: usize = usize::MAX;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the entity arena
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into the entity arena (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "entity(null)")
        } else {
            write!(f, "entity({}v{})", self.index(), self.generation())
        }
    }
}

/// Entity slot with its per-component index table.
#[derive(Clone, Debug)]
pub struct Entity {
    /// The unique identifier for this entity.
    pub id: EntityId,
    /// Whether this entity slot is currently alive.
    pub alive: bool,
    /// Slot index per component id, `UNUSED_COMPONENT_INDEX` when absent.
    component_indices: Vec<usize>,
}

impl Entity {
    /// Creates a new entity.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            alive: true,
            component_indices: Vec::new(),
        }
    }

    /// Creates a dead/empty entity slot.
    #[inline]
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            id: EntityId::NULL,
            alive: false,
            component_indices: Vec::new(),
        }
    }

    /// Checks if this entity has data in the store for `component_id`.
    #[inline]
    #[must_use]
    pub fn is_registered_for_component(&self, component_id: ComponentId) -> bool {
        self.component_data_index(component_id) != UNUSED_COMPONENT_INDEX
    }

    /// Returns the cached slot index for `component_id`.
    ///
    /// Returns `UNUSED_COMPONENT_INDEX` if the entity has no such component.
    #[inline]
    #[must_use]
    pub fn component_data_index(&self, component_id: ComponentId) -> usize {
        self.component_indices
            .get(component_id.index())
            .copied()
            .unwrap_or(UNUSED_COMPONENT_INDEX)
    }

    /// Caches the slot index for `component_id`.
    ///
    /// The table grows on demand. Passing `UNUSED_COMPONENT_INDEX` clears
    /// the entry.
    ///
    /// # Panics
    ///
    /// Panics if `component_id` is [`ComponentId::INVALID`].
    pub fn set_component_data_index(&mut self, component_id: ComponentId, index: usize) {
        assert!(component_id.is_valid(), "cannot index by an invalid component id");
        let slot = component_id.index();
        if slot >= self.component_indices.len() {
            if index == UNUSED_COMPONENT_INDEX {
                return;
            }
            self.component_indices
                .resize(slot + 1, UNUSED_COMPONENT_INDEX);
        }
        self.component_indices[slot] = index;
    }

    /// Iterates over the ids of every component this entity carries.
    pub fn registered_components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_indices
            .iter()
            .enumerate()
            .filter(|(_, index)| **index != UNUSED_COMPONENT_INDEX)
            .map(|(slot, _)| ComponentId::from_index(slot))
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::dead()
    }
}

/// Growable arena of entities.
///
/// Freed indices are reused, and every reuse bumps the slot's generation so
/// that handles to the previous occupant stop resolving.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    /// All entity slots, alive or dead.
    entities: Vec<Entity>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with room for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Spawns a new entity, returning its ID.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` entity slots would be needed.
    pub(crate) fn spawn(&mut self) -> EntityId {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            let entity = &mut self.entities[index as usize];

            // Increment generation to invalidate old references
            let generation = entity.id.generation().wrapping_add(1);
            let id = EntityId::new(index, generation);
            *entity = Entity::new(id);
            return id;
        }

        let Ok(index) = u32::try_from(self.entities.len()) else {
            panic!("entity arena exhausted: more than u32::MAX entities");
        };
        let id = EntityId::new(index, 0);
        self.entities.push(Entity::new(id));
        id
    }

    /// Despawns an entity, freeing its slot for reuse.
    ///
    /// The entity's component table is dropped as-is; callers remove the
    /// components first (see
    /// [`EntityManager::delete_marked_entities`](super::EntityManager::delete_marked_entities)).
    ///
    /// # Returns
    ///
    /// `true` if the entity was despawned, `false` if it was already dead
    /// or the ID was invalid/stale.
    pub(crate) fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };

        // Keep the id so the next spawn can bump its generation.
        entity.alive = false;
        entity.component_indices = Vec::new();
        self.alive_count -= 1;
        self.free_indices.push(id.index());
        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Gets an entity by ID.
    ///
    /// Returns `None` if the ID is null, dead or stale.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id.is_null() {
            return None;
        }
        self.entities
            .get(id.index() as usize)
            .filter(|entity| entity.alive && entity.id == id)
    }

    /// Gets a mutable entity by ID.
    ///
    /// Returns `None` if the ID is null, dead or stale.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id.is_null() {
            return None;
        }
        self.entities
            .get_mut(id.index() as usize)
            .filter(|entity| entity.alive && entity.id == id)
    }

    /// Iterates over all alive entities.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }
}
