//! # Memory Management
//!
//! Slot storage underneath every component store.
//!
//! ## Design Philosophy
//!
//! Records are addressed by stable integer indices, never by pointers:
//! - Freed slots are recycled before the pool grows
//! - Growth never moves an index
//! - Traversal works on cursors, so the pool may shrink mid-pass

mod pool;

pub use pool::{PoolCursor, VectorPool};
