//! In-memory indexing core for a blockchain archive node.
//!
//! The surrounding archive appends raw block and transaction bytes to
//! flat files; this crate maintains the lookup structures over them:
//!
//! - block height -> byte offset, block hash48 -> byte offset
//! - transaction id / hash48 -> byte offset
//! - address and topic logs -> matching transactions over a height range
//!
//! Identifiers are compact on purpose: hashes are truncated to 48 bits,
//! offsets to 40 bits, in-block positions to 24 bits, and every map packs
//! its leaf records without padding (see [`shard_map`]). Each map is
//! split into independent shards selected by the high bits of the key.
//!
//! ## Usage
//!
//! ```rust
//! use archive_memindex::{ArchiveIndex, TxOffsetsQuery};
//!
//! let mut index = ArchiveIndex::new();
//! index.add_block(100, 0x1234_5678_9ABC, 5000).unwrap();
//! index.add_tx((100 << 24) | 1, 0xAAAA_BBBB_CCCC, 5100).unwrap();
//! index.add_addr2log(0x0BAD_CAFE_0001, 100, &[1]).unwrap();
//!
//! assert_eq!(index.offset_by_block_height(100), Some(5000));
//! let offsets = index.query_tx_offsets(&TxOffsetsQuery {
//!     addr_hash: 0x0BAD_CAFE_0001,
//!     topic_hashes: vec![],
//!     start_height: 100,
//!     end_height: 100,
//! });
//! assert_eq!(offsets, vec![5100]);
//! ```

pub mod index;
pub mod indexes;
pub mod iter;
mod page;
mod query;
pub mod shard_map;
pub mod slots;
pub mod types;
pub mod utils;

pub use index::ArchiveIndex;
pub use indexes::SlotList;
pub use iter::TxIdIter;
pub use shard_map::{MapCursor, ShardedMap};
pub use types::{IndexError, IndexStats, TxOffsetsQuery};
pub use utils::hash48;
