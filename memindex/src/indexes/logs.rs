//! Address and topic log maps.
//!
//! Each entry maps `(hash48, height)` to a packed [`SlotList`]: the
//! in-block record indices of the transactions that touched the hash at
//! that height. Lists of up to three small indices are packed directly
//! into the 64-bit value; longer lists (or lists with indices past 20
//! bits) spill into the block's slot vector and the value stores where.

use crate::shard_map::{MapCursor, ShardedMap};
use crate::types::{HASH_MAP_SHARDS, MAX_UINT48};

/// Number of 20-bit lanes available for an inline list.
pub(crate) const INLINE_LANES: usize = 3;

const LANE_BITS: u32 = 20;
const LANE_MASK: u64 = (1 << LANE_BITS) - 1;
const TAG_SHIFT: u32 = 61;
const SPILL_TAG: u64 = 7;

/// Decoded form of a log map value.
///
/// The packed representation keeps the tag in the high 3 bits: 1..=3 is
/// an inline list of that many 20-bit indices, 7 is a spill whose low 61
/// bits locate the list inside the block's slot vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotList {
    /// 1..=3 record indices carried inside the value itself.
    Inline { len: u8, lanes: [u32; INLINE_LANES] },
    /// List stored out of line: `base` is the position of the length
    /// entry inside the block's slot vector.
    Spilled { base: u64 },
}

impl SlotList {
    /// Whether `indices` can be represented inline without loss.
    pub fn fits_inline(indices: &[u32]) -> bool {
        (1..=INLINE_LANES).contains(&indices.len())
            && indices.iter().all(|&ix| u64::from(ix) <= LANE_MASK)
    }

    /// Build an inline list. The caller guarantees [`Self::fits_inline`].
    pub fn inline(indices: &[u32]) -> Self {
        assert!(Self::fits_inline(indices), "list does not fit inline");
        let mut lanes = [0u32; INLINE_LANES];
        lanes[..indices.len()].copy_from_slice(indices);
        SlotList::Inline {
            len: indices.len() as u8,
            lanes,
        }
    }

    pub fn spilled(base: u64) -> Self {
        assert!(base >> TAG_SHIFT == 0, "spill base exceeds 61 bits");
        SlotList::Spilled { base }
    }

    /// Pack into the 64-bit map value.
    pub fn encode(&self) -> u64 {
        match *self {
            SlotList::Inline { len, lanes } => {
                let mut value = (len as u64) << TAG_SHIFT;
                for (i, &lane) in lanes[..len as usize].iter().enumerate() {
                    value |= (u64::from(lane) & LANE_MASK) << (LANE_BITS * i as u32);
                }
                value
            }
            SlotList::Spilled { base } => (SPILL_TAG << TAG_SHIFT) | base,
        }
    }

    /// Unpack a stored map value. Panics on a tag no encoder produces.
    pub fn decode(value: u64) -> Self {
        let tag = value >> TAG_SHIFT;
        let payload = (value << 3) >> 3;
        match tag {
            1..=3 => {
                let len = tag as usize;
                let mut lanes = [0u32; INLINE_LANES];
                for (i, lane) in lanes[..len].iter_mut().enumerate() {
                    *lane = ((payload >> (LANE_BITS * i as u32)) & LANE_MASK) as u32;
                }
                SlotList::Inline {
                    len: tag as u8,
                    lanes,
                }
            }
            SPILL_TAG => SlotList::Spilled { base: payload },
            _ => panic!("corrupt log map value: tag {tag}"),
        }
    }
}

/// Ordered map from `(hash48 low 32 << 32) | height` keys to packed
/// slot lists, sharded by the high 16 bits of the hash.
#[derive(Debug)]
pub(crate) struct LogMap {
    map: ShardedMap,
}

impl LogMap {
    pub fn new() -> Self {
        LogMap {
            map: ShardedMap::new(HASH_MAP_SHARDS, 8, 8),
        }
    }

    fn shard(hash48: u64) -> usize {
        debug_assert!(hash48 <= MAX_UINT48);
        ((hash48 >> 32) as usize) & (HASH_MAP_SHARDS - 1)
    }

    fn key(hash48: u64, height: u32) -> u64 {
        ((hash48 & 0xFFFF_FFFF) << 32) | u64::from(height)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn insert(&mut self, hash48: u64, height: u32, list: SlotList) {
        self.map
            .insert(Self::shard(hash48), Self::key(hash48, height), list.encode());
    }

    pub fn erase(&mut self, hash48: u64, height: u32) {
        self.map.erase(Self::shard(hash48), Self::key(hash48, height));
    }

    /// Cursor over the hash's entries for heights in
    /// `start_height..=end_height`.
    pub fn range(&self, hash48: u64, start_height: u32, end_height: u32) -> MapCursor<'_> {
        let shard = Self::shard(hash48);
        self.map.range(
            shard,
            Self::key(hash48, start_height),
            shard,
            Self::key(hash48, end_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_encode_decode() {
        for indices in [&[7u32][..], &[7, 8], &[1, 2, 3]] {
            let encoded = SlotList::inline(indices).encode();
            match SlotList::decode(encoded) {
                SlotList::Inline { len, lanes } => {
                    assert_eq!(len as usize, indices.len());
                    assert_eq!(&lanes[..indices.len()], indices);
                }
                other => panic!("expected inline, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_inline_full_lane_width() {
        let indices = [0xF_FFFF, 0, 0xF_FFFF];
        let list = SlotList::inline(&indices);
        assert_eq!(SlotList::decode(list.encode()), list);
    }

    #[test]
    fn test_wide_or_long_lists_do_not_fit_inline() {
        assert!(!SlotList::fits_inline(&[]));
        assert!(!SlotList::fits_inline(&[1, 2, 3, 4]));
        assert!(!SlotList::fits_inline(&[1 << 20]));
        assert!(SlotList::fits_inline(&[(1 << 20) - 1]));
    }

    #[test]
    fn test_spill_encode_decode() {
        let list = SlotList::spilled(12345);
        let encoded = list.encode();
        assert_eq!(encoded >> 61, 7);
        assert_eq!(SlotList::decode(encoded), list);
    }

    #[test]
    #[should_panic(expected = "corrupt log map value")]
    fn test_decode_rejects_zero_tag() {
        SlotList::decode(0);
    }

    #[test]
    fn test_log_map_orders_heights_per_hash() {
        let mut map = LogMap::new();
        let hash = 0x0000_00AB_0000_0001;
        map.insert(hash, 300, SlotList::inline(&[3]));
        map.insert(hash, 100, SlotList::inline(&[1]));
        map.insert(hash, 200, SlotList::inline(&[2]));
        // an unrelated hash sharing the shard must stay outside the range
        map.insert(0x0000_00AB_0000_0002, 150, SlotList::inline(&[9]));

        let mut cursor = map.range(hash, 100, 300);
        let mut heights = Vec::new();
        while cursor.valid() {
            heights.push(cursor.key() as u32);
            cursor.next();
        }
        assert_eq!(heights, vec![100, 200, 300]);

        map.erase(hash, 200);
        let cursor = map.range(hash, 200, 200);
        assert!(!cursor.valid());
    }
}
