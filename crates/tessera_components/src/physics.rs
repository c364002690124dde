//! # Physics
//!
//! Velocity integration. Every physics entity also carries a
//! [`TransformComponent`]: adding physics adds the transform if it is
//! missing, and each frame moves the transform by the velocity.

use crate::transform::TransformComponent;
use bytemuck::{Pod, Zeroable};
use tessera_core::{Component, ComponentStore, EntityId, EntityManager};

/// Default downward acceleration along Y, in units per second squared.
pub const STANDARD_GRAVITY: f32 = -9.81;

/// Velocity of an entity, in units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity.
    pub x: f32,
    /// Y velocity.
    pub y: f32,
    /// Z velocity.
    pub z: f32,
    /// Padding for alignment.
    pub _padding: f32,
}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }
}

/// Per-entity physics state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsData {
    /// Current velocity.
    pub velocity: Velocity,
    /// Multiplier on the component-wide gravity. `0.0` makes the entity
    /// float.
    pub gravity_scale: f32,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            velocity: Velocity::default(),
            gravity_scale: 1.0,
        }
    }
}

/// Physics component. Holds the gravity shared by every entity.
#[derive(Clone, Debug)]
pub struct PhysicsComponent {
    gravity: f32,
    integrated: u64,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self::new(STANDARD_GRAVITY)
    }
}

impl PhysicsComponent {
    /// Creates the component with the given gravity along Y.
    #[must_use]
    pub const fn new(gravity: f32) -> Self {
        Self {
            gravity,
            integrated: 0,
        }
    }

    /// Returns the gravity along Y.
    #[inline]
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Changes the gravity for all subsequent frames.
    #[inline]
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    /// Total number of per-entity integration steps run so far.
    #[inline]
    #[must_use]
    pub const fn integrated_steps(&self) -> u64 {
        self.integrated
    }
}

impl Component for PhysicsComponent {
    type Data = PhysicsData;

    fn init_entity(&mut self, entity: EntityId, _data: &mut PhysicsData, manager: &mut EntityManager) {
        if manager.add_component::<TransformComponent>(entity).is_none() {
            tracing::warn!("Physics added to {} but its transform could not be created", entity);
        }
    }

    fn update_all(store: &mut ComponentStore<Self>, manager: &mut EntityManager, delta_time: f32) {
        let gravity = store.component().gravity;
        let mut steps = 0_u64;

        for (entity, data) in store.iter_mut() {
            data.velocity.y += gravity * data.gravity_scale * delta_time;
            let velocity = data.velocity;

            // The transform can have been removed on its own since.
            let Some(position) = manager.component_data_mut::<TransformComponent>(entity) else {
                continue;
            };
            position.x += velocity.x * delta_time;
            position.y += velocity.y * delta_time;
            position.z += velocity.z * delta_time;
            steps += 1;
        }

        store.component_mut().integrated += steps;
    }
}
