//! Typed maps over the sharded core: each fixes its shard count, key and
//! value widths, and the bit packing of its keys.

mod blocks;
mod logs;
mod txs;

pub(crate) use blocks::{BlockHashIndex, BlockMap};
pub(crate) use logs::{LogMap, INLINE_LANES};
pub(crate) use txs::{TxHashIndex, TxIdIndex};

pub use logs::SlotList;
