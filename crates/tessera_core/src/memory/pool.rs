//! # Vector Pool
//!
//! Growable slot allocator for records that come and go unpredictably.
//!
//! Free slots are threaded into an intrusive free list, so both allocation
//! and deallocation are O(1) and a freed slot is reused before the pool grows.
//! Growth only ever appends, which keeps every issued index valid for the
//! lifetime of its occupant.

/// Terminator of the intrusive free list.
const NO_FREE_SLOT: usize = usize::MAX;

/// A single pool slot.
#[derive(Clone, Debug)]
enum Slot<T> {
    /// Holds a live value.
    Occupied(T),
    /// Linked into the free list.
    Free {
        /// Next free slot, or `NO_FREE_SLOT`.
        next_free: usize,
    },
}

impl<T> Slot<T> {
    #[inline]
    const fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }
}

/// Position of a traversal over the occupied slots of a [`VectorPool`].
///
/// Cursors are plain indices, so the pool can be mutated between steps.
/// The only mutation that keeps a traversal well defined is
/// [`VectorPool::free_at`], which hands back the proper successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolCursor {
    index: usize,
}

impl PoolCursor {
    /// The past-the-end cursor.
    pub const END: Self = Self { index: usize::MAX };

    /// Returns the slot index under the cursor, or `None` at the end.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        if self.is_end() {
            None
        } else {
            Some(self.index)
        }
    }

    /// Checks whether the traversal is finished.
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        self.index == usize::MAX
    }
}

/// A growable pool of fixed-size slots with stable indices.
///
/// # Thread Safety
///
/// This pool is NOT synchronized. Mutating it from more than one thread, or
/// traversing on one thread while mutating on another, requires external
/// locking supplied by the caller.
///
/// # Example
///
/// ```rust
/// use tessera_core::memory::VectorPool;
///
/// let mut pool = VectorPool::new();
/// let a = pool.allocate("a");
/// let b = pool.allocate("b");
/// pool.free(a);
///
/// // The freed slot is reused before the pool grows.
/// assert_eq!(pool.allocate("c"), a);
/// assert_eq!(pool.get(b), Some(&"b"));
/// ```
#[derive(Clone, Debug)]
pub struct VectorPool<T> {
    /// Slot storage. Only ever grows.
    slots: Vec<Slot<T>>,
    /// Head of the intrusive free list.
    free_head: usize,
    /// Number of occupied slots.
    occupied: usize,
}

impl<T> Default for VectorPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VectorPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NO_FREE_SLOT,
            occupied: 0,
        }
    }

    /// Creates an empty pool with room for `capacity` slots before the
    /// backing storage reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: NO_FREE_SLOT,
            occupied: 0,
        }
    }

    /// Returns the number of slots handed out so far, occupied or free.
    ///
    /// Every valid index is strictly below this value.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.occupied
    }

    /// Checks whether no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns how many slots fit before the backing storage reallocates.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Stores `value` in a free slot and returns its index.
    ///
    /// Reuses the most recently freed slot when there is one, otherwise
    /// appends. Amortized **O(1)**.
    pub fn allocate(&mut self, value: T) -> usize {
        self.occupied += 1;

        let index = self.free_head;
        match self.slots.get_mut(index) {
            Some(slot) => {
                let Slot::Free { next_free } = *slot else {
                    unreachable!("free list head {index} points at an occupied slot");
                };
                self.free_head = next_free;
                *slot = Slot::Occupied(value);
                index
            }
            None => {
                self.slots.push(Slot::Occupied(value));
                self.slots.len() - 1
            }
        }
    }

    /// Frees the slot at `index` and returns its previous occupant.
    ///
    /// **O(1)**.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or already free. Callers own the
    /// bookkeeping that rules this out.
    pub fn free(&mut self, index: usize) -> T {
        let slot_count = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            panic!("cannot free slot {index}: out of range ({slot_count} slots)");
        };
        assert!(slot.is_occupied(), "cannot free slot {index}: slot is already free");

        let previous = std::mem::replace(
            slot,
            Slot::Free {
                next_free: self.free_head,
            },
        );
        self.free_head = index;
        self.occupied -= 1;

        match previous {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => unreachable!("slot {index} checked occupied above"),
        }
    }

    /// Frees the slot under `cursor` and returns the cursor of the next
    /// occupied slot.
    ///
    /// This is the only way to shrink the pool in the middle of a traversal
    /// and still visit every remaining occupant exactly once.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is the end cursor or points at a free slot.
    pub fn free_at(&mut self, cursor: PoolCursor) -> PoolCursor {
        let Some(index) = cursor.index() else {
            panic!("cannot free through the end cursor");
        };
        self.free(index);
        self.seek(index + 1)
    }

    /// Gets the occupant of `index`.
    ///
    /// Returns `None` when `index` is out of range or the slot is free.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        match self.slots.get(index)? {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Gets the occupant of `index` mutably.
    ///
    /// Returns `None` when `index` is out of range or the slot is free.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.slots.get_mut(index)? {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Checks whether `index` currently holds a value.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Slot::is_occupied)
    }

    /// Returns a cursor at the first occupied slot.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> PoolCursor {
        self.seek(0)
    }

    /// Returns the past-the-end cursor.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> PoolCursor {
        PoolCursor::END
    }

    /// Moves `cursor` to the next occupied slot.
    #[inline]
    #[must_use]
    pub fn advance(&self, cursor: PoolCursor) -> PoolCursor {
        match cursor.index() {
            Some(index) => self.seek(index + 1),
            None => cursor,
        }
    }

    /// Iterates over occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied(value) => Some((index, value)),
                Slot::Free { .. } => None,
            })
    }

    /// Iterates mutably over occupied slots in ascending index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied(value) => Some((index, value)),
                Slot::Free { .. } => None,
            })
    }

    /// First occupied slot at or after `from`.
    fn seek(&self, from: usize) -> PoolCursor {
        self.slots
            .get(from..)
            .and_then(|rest| rest.iter().position(Slot::is_occupied))
            .map_or(PoolCursor::END, |offset| PoolCursor {
                index: from + offset,
            })
    }
}
