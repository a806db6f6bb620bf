//! Packed 24-bit slot vectors and the arena that owns them.
//!
//! Every block may own one [`SlotVec`] holding the spilled log index
//! lists recorded at its height: each spill appends one length entry
//! followed by that many index entries. Entries are 3 bytes each, so the
//! vector carries no padding. Vectors live in a [`SlotArena`] owned by
//! the index facade; the block content map stores 40-bit arena handles
//! instead of pointers.

use crate::types::MAX_UINT40;
use crate::utils::{bytes_to_uint24, uint24_to_bytes};

/// Handle value meaning "this block has no slot vector".
pub(crate) const NULL_SLOT_HANDLE: u64 = MAX_UINT40;

/// Growable vector of packed 24-bit unsigned integers.
#[derive(Debug, Default)]
pub struct SlotVec {
    data: Vec<u8>,
}

impl SlotVec {
    pub fn new() -> Self {
        SlotVec { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one 24-bit entry.
    pub fn push(&mut self, value: u32) {
        self.data.extend_from_slice(&uint24_to_bytes(value));
    }

    /// Entry at `index`; panics when out of bounds.
    pub fn get(&self, index: usize) -> u32 {
        bytes_to_uint24(&self.data[index * 3..index * 3 + 3])
    }

    /// Release spare capacity. Applied to the previous block's vector
    /// when a new block is added.
    pub fn shrink(&mut self) {
        self.data.shrink_to_fit();
    }
}

/// Slab of slot vectors addressed by 40-bit handles.
#[derive(Debug, Default)]
pub(crate) struct SlotArena {
    entries: Vec<Option<SlotVec>>,
    free: Vec<usize>,
}

impl SlotArena {
    pub fn new() -> Self {
        SlotArena::default()
    }

    /// Number of live vectors.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    /// Create an empty vector and return its handle.
    pub fn allocate(&mut self) -> u64 {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.entries[slot] = Some(SlotVec::new());
                slot
            }
            None => {
                self.entries.push(Some(SlotVec::new()));
                self.entries.len() - 1
            }
        };
        let handle = slot as u64;
        assert!(handle < NULL_SLOT_HANDLE, "slot arena handle space exhausted");
        handle
    }

    pub fn get(&self, handle: u64) -> Option<&SlotVec> {
        self.entries.get(handle as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut SlotVec> {
        self.entries.get_mut(handle as usize)?.as_mut()
    }

    /// Drop the vector behind `handle`; the null handle and already
    /// released handles are a no-op.
    pub fn release(&mut self, handle: u64) {
        if handle == NULL_SLOT_HANDLE {
            return;
        }
        let slot = handle as usize;
        if slot < self.entries.len() && self.entries[slot].take().is_some() {
            self.free.push(slot);
        }
    }
}
