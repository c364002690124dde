//! # TESSERA Components
//!
//! Ready-made component types built on [`tessera_core`]:
//! - [`TransformComponent`] - one POD position per entity
//! - [`PhysicsComponent`] - velocity integrated into the transform
//! - [`LifetimeComponent`] - entities that delete themselves after a while
//!
//! Physics adds transforms from its hooks, so transforms must be registered
//! first. [`register_all`] does it in the right order.
//!
//! ## Example
//!
//! ```rust
//! use tessera_components::{register_all, LifetimeComponent, Lifetime, PhysicsComponent};
//! use tessera_core::EntityManager;
//!
//! let mut manager = EntityManager::new();
//! register_all(&mut manager).unwrap();
//!
//! let spark = manager.allocate_new_entity();
//! manager.add_component::<PhysicsComponent>(spark);
//! *manager.add_component::<LifetimeComponent>(spark).unwrap() = Lifetime::seconds(0.25);
//!
//! manager.update_components(0.5);
//! assert!(!manager.is_alive(spark));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod lifetime;
pub mod physics;
pub mod transform;

pub use lifetime::{Lifetime, LifetimeComponent};
pub use physics::{PhysicsComponent, PhysicsData, Velocity, STANDARD_GRAVITY};
pub use transform::{gather_positions, positions_as_bytes, Position, TransformComponent};

use tessera_core::{EcsResult, EntityManager};

/// Registers transform, physics and lifetime, in that order.
///
/// # Errors
///
/// Returns an error if any of them is already registered or the manager's
/// component limit is reached.
pub fn register_all(manager: &mut EntityManager) -> EcsResult<()> {
    manager.register_component(TransformComponent)?;
    manager.register_component(PhysicsComponent::default())?;
    manager.register_component(LifetimeComponent::default())?;
    Ok(())
}
