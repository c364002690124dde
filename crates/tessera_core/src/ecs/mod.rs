//! # Entity Component System
//!
//! Typed component storage behind an index-indirection contract.
//!
//! ## Design Philosophy
//!
//! - Entities and component records live in separate arenas
//! - The only cross-references are integer indices and generational ids
//! - Every component type shares the same pooled store mechanics
//! - Component types customize behavior through hooks, nothing else

mod component;
mod entity;
mod manager;
mod storage;

pub use component::{Component, ComponentId, ComponentInterface};
pub use entity::{Entity, EntityId, EntityRegistry, UNUSED_COMPONENT_INDEX};
pub use manager::EntityManager;
pub use storage::{ComponentStore, EntityData};
