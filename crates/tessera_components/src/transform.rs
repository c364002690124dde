//! # Transform
//!
//! One world-space [`Position`] per entity, laid out as plain old data so a
//! whole store can be handed to a renderer as bytes.

use bytemuck::{Pod, Zeroable};
use tessera_core::{Component, ComponentStore};

/// World-space position of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
    /// Z coordinate in world space.
    pub z: f32,
    /// Padding for alignment (ensures 16-byte alignment for SIMD).
    pub _padding: f32,
}

impl Position {
    /// Creates a new position.
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

    /// Returns the squared distance to another position.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Component storing a [`Position`] per entity. Stateless, no hooks.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformComponent;

impl Component for TransformComponent {
    type Data = Position;
}

/// Copies every position into a contiguous buffer, in slot order.
#[must_use]
pub fn gather_positions(store: &ComponentStore<TransformComponent>) -> Vec<Position> {
    store.iter().map(|(_, position)| *position).collect()
}

/// Views packed positions as raw bytes, 16 per position.
#[inline]
#[must_use]
pub fn positions_as_bytes(positions: &[Position]) -> &[u8] {
    bytemuck::cast_slice(positions)
}
