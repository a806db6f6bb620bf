//! The index facade: one object owning every map and slot vector.

use tracing::debug;

use crate::indexes::{BlockHashIndex, BlockMap, LogMap, SlotList, TxHashIndex, TxIdIndex};
use crate::iter::TxIdIter;
use crate::slots::{SlotArena, NULL_SLOT_HANDLE};
use crate::types::{IndexError, IndexStats, TxOffsetsQuery, MAX_UINT40};

/// Which of the two log maps an operation targets.
#[derive(Debug, Clone, Copy)]
enum LogTarget {
    Address,
    Topic,
}

/// In-memory index over an archive's blocks, transactions and logs.
///
/// Blocks and transactions are identified by 48-bit truncated digests and
/// located by 40-bit byte offsets into the external store. The index owns
/// all of its memory; it is neither clonable nor copyable, and every
/// operation runs synchronously on the calling thread.
#[derive(Debug)]
pub struct ArchiveIndex {
    blocks: BlockMap,
    block_hashes: BlockHashIndex,
    tx_ids: TxIdIndex,
    tx_hashes: TxHashIndex,
    addr_logs: LogMap,
    topic_logs: LogMap,
    arena: SlotArena,
}

impl Default for ArchiveIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveIndex {
    pub fn new() -> Self {
        ArchiveIndex {
            blocks: BlockMap::new(),
            block_hashes: BlockHashIndex::new(),
            tx_ids: TxIdIndex::new(),
            tx_hashes: TxHashIndex::new(),
            addr_logs: LogMap::new(),
            topic_logs: LogMap::new(),
            arena: SlotArena::new(),
        }
    }

    /// Record a block at `height`, stored at `offset40`. Refuses the
    /// block when another block already uses the same `hash48`.
    pub fn add_block(&mut self, height: u32, hash48: u64, offset40: i64) -> Result<(), IndexError> {
        // the previous block is sealed now, release its spare capacity
        if let Some(prev) = height.checked_sub(1) {
            self.shrink_slot_vec(prev);
        }
        if self.block_hashes.contains(hash48) {
            debug!(
                "refusing block {}: hash48 {:#014x} already in use",
                height, hash48
            );
            return Err(IndexError::HashCollision(hash48));
        }
        self.blocks
            .insert(height, offset40 as u64 & MAX_UINT40, NULL_SLOT_HANDLE);
        self.block_hashes.insert(hash48, height);
        Ok(())
    }

    /// Drop the block at `height` along with its slot vector, and unbind
    /// its hash. Absent entries are a no-op.
    pub fn erase_block(&mut self, height: u32, hash48: u64) {
        if let Some(handle) = self.blocks.erase(height) {
            self.arena.release(handle);
        }
        self.block_hashes.erase(hash48);
    }

    /// Byte offset of the block at `height`.
    pub fn offset_by_block_height(&self, height: u32) -> Option<u64> {
        self.blocks.find(height).map(|entry| entry.offset40())
    }

    /// Byte offset of the block with the given hash48, resolved through
    /// the hash index.
    pub fn offset_by_block_hash(&self, hash48: u64) -> Option<u64> {
        let height = self.block_hashes.get(hash48)?;
        self.offset_by_block_height(height)
    }

    /// Record a transaction under both its 56-bit id and its hash48.
    /// Refuses the transaction when the hash48 is already bound.
    pub fn add_tx(&mut self, id56: u64, hash48: u64, offset40: i64) -> Result<(), IndexError> {
        if self.tx_hashes.contains(hash48) {
            debug!(
                "refusing tx {:#x}: hash48 {:#014x} already in use",
                id56, hash48
            );
            return Err(IndexError::HashCollision(hash48));
        }
        let offset40 = offset40 as u64 & MAX_UINT40;
        self.tx_ids.insert(id56, offset40);
        self.tx_hashes.insert(hash48, offset40);
        Ok(())
    }

    /// Drop a transaction from both indexes. Absent entries are a no-op.
    pub fn erase_tx(&mut self, id56: u64, hash48: u64) {
        self.tx_ids.erase(id56);
        self.tx_hashes.erase(hash48);
    }

    /// Byte offset of the transaction with the given 56-bit id.
    pub fn offset_by_tx_id(&self, id56: u64) -> Option<u64> {
        self.tx_ids.get(id56)
    }

    /// Byte offset of the transaction with the given hash48.
    pub fn offset_by_tx_hash(&self, hash48: u64) -> Option<u64> {
        self.tx_hashes.get(hash48)
    }

    /// Record the in-block indices of the transactions whose logs touch
    /// `hash48` (an address) at `height`. Indices must be supplied in
    /// ascending order; an empty list is a no-op. Lists that cannot be
    /// packed inline spill into the block's slot vector, so the block
    /// must already be indexed.
    pub fn add_addr2log(
        &mut self,
        hash48: u64,
        height: u32,
        indices: &[u32],
    ) -> Result<(), IndexError> {
        self.add_to_log_map(LogTarget::Address, hash48, height, indices)
    }

    pub fn erase_addr2log(&mut self, hash48: u64, height: u32) {
        self.addr_logs.erase(hash48, height);
    }

    /// Topic counterpart of [`Self::add_addr2log`].
    pub fn add_topic2log(
        &mut self,
        hash48: u64,
        height: u32,
        indices: &[u32],
    ) -> Result<(), IndexError> {
        self.add_to_log_map(LogTarget::Topic, hash48, height, indices)
    }

    pub fn erase_topic2log(&mut self, hash48: u64, height: u32) {
        self.topic_logs.erase(hash48, height);
    }

    /// Iterator over the ids of transactions whose logs touch the
    /// address `hash48` within `start_height..=end_height`.
    pub fn addr_iterator(&self, hash48: u64, start_height: u32, end_height: u32) -> TxIdIter<'_> {
        TxIdIter::new(
            &self.blocks,
            &self.arena,
            self.addr_logs.range(hash48, start_height, end_height),
        )
    }

    /// Topic counterpart of [`Self::addr_iterator`].
    pub fn topic_iterator(&self, hash48: u64, start_height: u32, end_height: u32) -> TxIdIter<'_> {
        TxIdIter::new(
            &self.blocks,
            &self.arena,
            self.topic_logs.range(hash48, start_height, end_height),
        )
    }

    /// Offsets of the transactions matching the query's address and all
    /// of its topics, ascending by transaction id. Ids missing from the
    /// tx index yield `-1` entries.
    pub fn query_tx_offsets(&self, query: &TxOffsetsQuery) -> Vec<i64> {
        crate::query::run(self, query)
    }

    /// Entry counts, for tooling.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            blocks: self.blocks.len(),
            txs: self.tx_ids.len(),
            addr_log_entries: self.addr_logs.len(),
            topic_log_entries: self.topic_logs.len(),
            slot_vecs: self.arena.len(),
        }
    }

    fn add_to_log_map(
        &mut self,
        target: LogTarget,
        hash48: u64,
        height: u32,
        indices: &[u32],
    ) -> Result<(), IndexError> {
        if indices.is_empty() {
            return Ok(());
        }
        let list = if SlotList::fits_inline(indices) {
            SlotList::inline(indices)
        } else {
            let handle = self
                .slot_vec_handle(height)
                .ok_or(IndexError::BlockMissing(height))?;
            let vec = self
                .arena
                .get_mut(handle)
                .expect("live block entry holds a dangling slot handle");
            let base = vec.len() as u64;
            vec.push(indices.len() as u32);
            for &index in indices {
                vec.push(index);
            }
            SlotList::spilled(base)
        };
        let map = match target {
            LogTarget::Address => &mut self.addr_logs,
            LogTarget::Topic => &mut self.topic_logs,
        };
        map.insert(hash48, height, list);
        Ok(())
    }

    /// Handle of the slot vector for `height`, allocating one on first
    /// use. `None` when no block is indexed at that height.
    fn slot_vec_handle(&mut self, height: u32) -> Option<u64> {
        let entry = self.blocks.find(height)?;
        if entry.handle != NULL_SLOT_HANDLE {
            return Some(entry.handle);
        }
        let handle = self.arena.allocate();
        self.blocks.set_handle(height, entry.key, handle);
        Some(handle)
    }

    fn shrink_slot_vec(&mut self, height: u32) {
        if let Some(entry) = self.blocks.find(height) {
            if let Some(vec) = self.arena.get_mut(entry.handle) {
                vec.shrink();
            }
        }
    }
}
