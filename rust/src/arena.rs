//! Slot arena that owns every tree node.
//!
//! Nodes refer to each other by `NodeId`, the index of their slot. Freed
//! slots form an intrusive chain and are handed out again before the arena
//! grows, so ids stay small and dense after the bit-plane loader discards
//! its placeholders.

use std::ops::{Index, IndexMut};

use crate::types::{NodeId, NULL_NODE};

/// Occupancy summary of a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Slots ever handed out.
    pub slots: usize,
    /// Slots holding a node.
    pub live: usize,
    /// Slots waiting on the free chain.
    pub free: usize,
    /// Slots the backing vector can hold before reallocating.
    pub reserved: usize,
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Live(T),
    /// Freed slot; `next` is the following free slot or `NULL_NODE`.
    Free { next: NodeId },
}

/// Arena of `T` addressed by `NodeId`.
#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free_head: NodeId,
    free: usize,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Arena with room for `capacity` nodes before it reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: NULL_NODE,
            free: 0,
        }
    }

    /// Store `item` and return its id, reusing the most recently freed slot.
    pub fn allocate(&mut self, item: T) -> NodeId {
        if self.free_head != NULL_NODE {
            let id = self.free_head;
            let slot = &mut self.slots[id as usize];
            if let Slot::Free { next } = *slot {
                self.free_head = next;
            }
            *slot = Slot::Live(item);
            self.free -= 1;
            return id;
        }

        let id = self.slots.len();
        assert!(
            id < NULL_NODE as usize,
            "arena exhausted: slot {} does not fit in a NodeId",
            id
        );
        self.slots.push(Slot::Live(item));
        id as NodeId
    }

    /// Remove the node in `id`, returning it; `None` if the slot is not live.
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id as usize)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }
        let freed = std::mem::replace(
            slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = id;
        self.free += 1;
        match freed {
            Slot::Live(item) => Some(item),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id as usize)? {
            Slot::Live(item) => Some(item),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id as usize)? {
            Slot::Live(item) => Some(item),
            Slot::Free { .. } => None,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// `(id, node)` for every live slot, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Live(item) => Some((index as NodeId, item)),
                Slot::Free { .. } => None,
            })
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            slots: self.slots.len(),
            live: self.len(),
            free: self.free,
            reserved: self.slots.capacity(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots ever handed out; every live `NodeId` is below this.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(item) => item,
            None => panic!("node {} is not allocated in the arena", id),
        }
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(item) => item,
            None => panic!("node {} is not allocated in the arena", id),
        }
    }
}
