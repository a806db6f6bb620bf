use thiserror::Error;

/// Maximum value for uint24 (3 bytes)
pub const MAX_UINT24: u32 = (1 << 24) - 1;

/// Maximum value for uint40 (5 bytes)
pub const MAX_UINT40: u64 = (1 << 40) - 1;

/// Maximum value for uint48 (6 bytes)
pub const MAX_UINT48: u64 = (1 << 48) - 1;

/// Maximum value for uint56 (7 bytes)
pub const MAX_UINT56: u64 = (1 << 56) - 1;

/// Shard count of the block content map; shard = `height >> 24`.
pub const BLOCK_MAP_SHARDS: usize = 1 << 8;

/// Shard count of every hash-keyed map; shard = high 16 bits of the
/// 48-bit identifier (or of the 56-bit tx id).
pub const HASH_MAP_SHARDS: usize = 1 << 16;

/// Errors produced by index mutations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// The 48-bit identifier is already bound to another block or
    /// transaction in the same shard.
    #[error("hash48 {0:#014x} is already in use")]
    HashCollision(u64),

    /// A log entry had to spill into a per-block slot vector, but no
    /// block is indexed at that height.
    #[error("no block indexed at height {0}")]
    BlockMissing(u32),
}

/// Parameters of a transaction-offset query: transactions matching the
/// address (when nonzero) and every topic, over a closed height range.
#[derive(Debug, Clone, Default)]
pub struct TxOffsetsQuery {
    /// 48-bit address identifier; 0 means no address criterion.
    pub addr_hash: u64,
    /// 48-bit topic identifiers, all of which must match.
    pub topic_hashes: Vec<u64>,
    pub start_height: u32,
    pub end_height: u32,
}

/// Entry counts across the index, for monitoring and tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub blocks: usize,
    pub txs: usize,
    pub addr_log_entries: usize,
    pub topic_log_entries: usize,
    /// Live per-block slot vectors holding spilled log lists.
    pub slot_vecs: usize,
}
