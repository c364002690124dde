//! # Lifetime
//!
//! Self-expiring entities. Each frame the remaining time of every record
//! shrinks; a record that runs out is removed on the spot, mid-traversal,
//! and its entity is marked for deletion at the end of the frame.

use tessera_core::{Component, ComponentStore, EntityId, EntityManager};

/// Remaining time of an entity, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifetime {
    /// Seconds left. Infinite by default.
    pub remaining: f32,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self {
            remaining: f32::INFINITY,
        }
    }
}

impl Lifetime {
    /// Creates a lifetime of `seconds`.
    #[inline]
    #[must_use]
    pub const fn seconds(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Checks whether no time is left.
    #[inline]
    #[must_use]
    pub fn is_expired(self) -> bool {
        self.remaining <= 0.0
    }
}

/// Lifetime component. Counts what it removed.
#[derive(Clone, Debug, Default)]
pub struct LifetimeComponent {
    expired: u64,
    removed: u64,
}

impl LifetimeComponent {
    /// Number of records removed because their time ran out.
    #[inline]
    #[must_use]
    pub const fn expired(&self) -> u64 {
        self.expired
    }

    /// Number of records removed for any reason.
    #[inline]
    #[must_use]
    pub const fn removed(&self) -> u64 {
        self.removed
    }
}

impl Component for LifetimeComponent {
    type Data = Lifetime;

    fn cleanup_entity(&mut self, _entity: EntityId, data: &mut Lifetime, _manager: &mut EntityManager) {
        self.removed += 1;
        if data.is_expired() {
            self.expired += 1;
        }
    }

    fn update_all(store: &mut ComponentStore<Self>, manager: &mut EntityManager, delta_time: f32) {
        let before = store.component().expired;

        let mut cursor = store.begin();
        while let Some(index) = cursor.index() {
            let Some((entity, lifetime)) = store.record_at_mut(index) else {
                break;
            };
            lifetime.remaining -= delta_time;
            if !lifetime.is_expired() {
                cursor = store.advance(cursor);
                continue;
            }

            tracing::trace!("{} expired", entity);
            manager.delete_entity(entity);
            cursor = store.remove_entity_at(cursor, manager);
        }

        let expired = store.component().expired - before;
        if expired > 0 {
            tracing::debug!("{} lifetimes expired this frame", expired);
        }
    }
}
