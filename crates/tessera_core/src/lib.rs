//! # TESSERA Core
//!
//! Typed, pooled component storage for an entity-component architecture:
//! - O(1) add, remove and lookup of per-entity data
//! - Slot indices that stay put while their occupant lives
//! - Traversal that survives removing the current record
//!
//! ## Architecture Rules
//!
//! 1. **Indices, not pointers** - entities cache slot indices, records name
//!    their owner by generational id
//! 2. **One mechanism, many types** - every component type is a
//!    [`ComponentStore`] over a [`VectorPool`](memory::VectorPool)
//! 3. **Absent is not an error** - lookups return `None`; misuse panics
//! 4. **Single-threaded** - no locks or atomics; callers synchronize
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Component, EntityManager};
//!
//! struct Velocity;
//!
//! impl Component for Velocity {
//!     type Data = [f32; 3];
//! }
//!
//! let mut manager = EntityManager::new();
//! manager.register_component(Velocity).unwrap();
//!
//! let entity = manager.allocate_new_entity();
//! manager.add_component::<Velocity>(entity).unwrap()[1] = -9.8;
//! assert_eq!(manager.component_data::<Velocity>(entity), Some(&[0.0, -9.8, 0.0]));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::EcsConfig;
pub use ecs::{
    Component, ComponentId, ComponentInterface, ComponentStore, Entity, EntityData, EntityId,
    EntityManager, EntityRegistry, UNUSED_COMPONENT_INDEX,
};
pub use error::{EcsError, EcsResult};
pub use memory::{PoolCursor, VectorPool};
