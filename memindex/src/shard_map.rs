//! Sharded ordered map over packed integer records.
//!
//! The map is split into a fixed, power-of-two number of independent
//! sub-maps. The caller routes every operation with an explicit shard
//! index, extracted from the high bits of the key; the map itself never
//! hashes or re-shards. Within a shard, records live in sorted leaf pages
//! (see [`crate::page`]) and iterate in ascending unsigned key order.
//!
//! Cursors borrow the map shared, so the borrow checker statically rules
//! out mutating a shard while a cursor over it is alive.

use crate::page::{Page, RecordLayout};

/// Ordered map from fixed-width integer keys to fixed-width integer
/// values, partitioned into independently mutable shards.
#[derive(Debug)]
pub struct ShardedMap {
    shards: Vec<Shard>,
    layout: RecordLayout,
    len: usize,
}

#[derive(Debug, Default)]
struct Shard {
    pages: Vec<Page>,
}

impl Shard {
    /// Exact-match search: `Ok((page, slot))` when `key` is present,
    /// `Err` with its insertion position otherwise.
    fn locate(&self, l: RecordLayout, key: u64) -> Result<(usize, usize), (usize, usize)> {
        if self.pages.is_empty() {
            return Err((0, 0));
        }
        let page = self
            .pages
            .partition_point(|p| p.first_key(l) <= key)
            .saturating_sub(1);
        match self.pages[page].search(l, key) {
            Ok(slot) => Ok((page, slot)),
            Err(slot) => Err((page, slot)),
        }
    }

    /// Position of the first record with key >= `key`; may point one past
    /// the end of a page (or of the shard) and is normalized by the cursor.
    fn lower_bound(&self, l: RecordLayout, key: u64) -> (usize, usize) {
        match self.locate(l, key) {
            Ok(pos) | Err(pos) => pos,
        }
    }
}

impl ShardedMap {
    /// Create a map with `shard_count` shards (a power of two) and the
    /// given key/value widths in bytes.
    pub fn new(shard_count: usize, key_width: usize, value_width: usize) -> Self {
        assert!(
            shard_count.is_power_of_two(),
            "shard count must be a power of two"
        );
        let mut shards = Vec::with_capacity(shard_count);
        shards.resize_with(shard_count, Shard::default);
        ShardedMap {
            shards,
            layout: RecordLayout::new(key_width, value_width),
            len: 0,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of records across all shards.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upsert: replaces the value when `key` is already present.
    pub fn insert(&mut self, shard: usize, key: u64, value: u64) {
        let l = self.layout;
        assert!(key <= l.max_key(), "key wider than the map's key width");
        assert!(
            value <= l.max_value(),
            "value wider than the map's value width"
        );
        let sh = &mut self.shards[shard];
        match sh.locate(l, key) {
            Ok((page, slot)) => sh.pages[page].set_value_at(l, slot, value),
            Err((mut page, mut slot)) => {
                if sh.pages.is_empty() {
                    sh.pages.push(Page::new());
                } else if sh.pages[page].is_full(l) {
                    let upper = sh.pages[page].split(l);
                    let kept = sh.pages[page].len(l);
                    sh.pages.insert(page + 1, upper);
                    if slot > kept {
                        page += 1;
                        slot -= kept;
                    }
                }
                sh.pages[page].insert_at(l, slot, key, value);
                self.len += 1;
            }
        }
    }

    /// Remove `key` if present; absent keys are a no-op.
    pub fn erase(&mut self, shard: usize, key: u64) {
        let l = self.layout;
        let sh = &mut self.shards[shard];
        if let Ok((page, slot)) = sh.locate(l, key) {
            sh.pages[page].remove_at(l, slot);
            if sh.pages[page].is_empty() {
                sh.pages.remove(page);
            }
            self.len -= 1;
        }
    }

    /// Exact-match lookup.
    pub fn get(&self, shard: usize, key: u64) -> Option<u64> {
        let l = self.layout;
        let sh = &self.shards[shard];
        match sh.locate(l, key) {
            Ok((page, slot)) => Some(sh.pages[page].value_at(l, slot)),
            Err(_) => None,
        }
    }

    /// Cursor at the first key >= `key` within `shard`, plus an
    /// exact-match flag. The cursor runs to the end of the shard.
    pub fn seek(&self, shard: usize, key: u64) -> (MapCursor<'_>, bool) {
        let l = self.layout;
        let (found, (page, slot)) = match self.shards[shard].locate(l, key) {
            Ok(pos) => (true, pos),
            Err(pos) => (false, pos),
        };
        let mut cursor = MapCursor {
            map: self,
            shard,
            page,
            slot,
            end_shard: shard,
            end_key: l.max_key(),
            exhausted: false,
        };
        cursor.settle();
        (cursor, found)
    }

    /// Forward cursor over the closed range `(shard_lo, key_lo)` ..=
    /// `(shard_hi, key_hi)` in lexicographic (shard, key) order. The key
    /// bounds apply within the first and last shard; intermediate shards
    /// are traversed in full.
    pub fn range(
        &self,
        shard_lo: usize,
        key_lo: u64,
        shard_hi: usize,
        key_hi: u64,
    ) -> MapCursor<'_> {
        assert!(
            shard_lo <= shard_hi && shard_hi < self.shards.len(),
            "shard range out of bounds"
        );
        let (page, slot) = self.shards[shard_lo].lower_bound(self.layout, key_lo);
        let mut cursor = MapCursor {
            map: self,
            shard: shard_lo,
            page,
            slot,
            end_shard: shard_hi,
            end_key: key_hi,
            exhausted: false,
        };
        cursor.settle();
        cursor
    }
}

/// Forward cursor over a closed key range of a [`ShardedMap`].
#[derive(Debug)]
pub struct MapCursor<'a> {
    map: &'a ShardedMap,
    shard: usize,
    page: usize,
    slot: usize,
    end_shard: usize,
    end_key: u64,
    exhausted: bool,
}

impl MapCursor<'_> {
    pub fn valid(&self) -> bool {
        !self.exhausted
    }

    /// Key under the cursor. The cursor must be valid.
    pub fn key(&self) -> u64 {
        assert!(self.valid(), "cursor is exhausted");
        self.map.shards[self.shard].pages[self.page].key_at(self.map.layout, self.slot)
    }

    /// Value under the cursor. The cursor must be valid.
    pub fn value(&self) -> u64 {
        assert!(self.valid(), "cursor is exhausted");
        self.map.shards[self.shard].pages[self.page].value_at(self.map.layout, self.slot)
    }

    /// Advance to the next record; past the range's upper bound the
    /// cursor becomes invalid.
    pub fn next(&mut self) {
        if self.exhausted {
            return;
        }
        self.slot += 1;
        self.settle();
    }

    /// Normalize the position: skip exhausted pages and shards, then
    /// enforce the closed upper bound.
    fn settle(&mut self) {
        loop {
            if self.shard > self.end_shard {
                self.exhausted = true;
                return;
            }
            let sh = &self.map.shards[self.shard];
            if self.page >= sh.pages.len() {
                self.shard += 1;
                self.page = 0;
                self.slot = 0;
                continue;
            }
            let pg = &sh.pages[self.page];
            if self.slot >= pg.len(self.map.layout) {
                self.page += 1;
                self.slot = 0;
                continue;
            }
            if self.shard == self.end_shard
                && pg.key_at(self.map.layout, self.slot) > self.end_key
            {
                self.exhausted = true;
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_erase() {
        let mut map = ShardedMap::new(16, 8, 8);
        map.insert(3, 100, 1000);
        map.insert(3, 50, 500);
        map.insert(5, 100, 9999);
        assert_eq!(map.get(3, 100), Some(1000));
        assert_eq!(map.get(3, 50), Some(500));
        assert_eq!(map.get(5, 100), Some(9999));
        assert_eq!(map.get(3, 51), None);
        assert_eq!(map.len(), 3);

        map.insert(3, 100, 1001); // upsert
        assert_eq!(map.get(3, 100), Some(1001));
        assert_eq!(map.len(), 3);

        map.erase(3, 100);
        assert_eq!(map.get(3, 100), None);
        map.erase(3, 100); // absent erase is a no-op
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_seek_reports_exact_match() {
        let mut map = ShardedMap::new(4, 8, 8);
        map.insert(0, 10, 1);
        map.insert(0, 20, 2);
        map.insert(0, 30, 3);

        let (cursor, found) = map.seek(0, 20);
        assert!(found);
        assert_eq!(cursor.key(), 20);

        let (cursor, found) = map.seek(0, 21);
        assert!(!found);
        assert!(cursor.valid());
        assert_eq!(cursor.key(), 30);

        let (cursor, found) = map.seek(0, 31);
        assert!(!found);
        assert!(!cursor.valid());
    }

    #[test]
    fn test_range_is_closed_and_ordered() {
        let mut map = ShardedMap::new(4, 8, 8);
        for key in [5u64, 10, 15, 20, 25] {
            map.insert(1, key, key * 2);
        }
        let mut cursor = map.range(1, 10, 1, 20);
        let mut seen = Vec::new();
        while cursor.valid() {
            seen.push((cursor.key(), cursor.value()));
            cursor.next();
        }
        assert_eq!(seen, vec![(10, 20), (15, 30), (20, 40)]);
    }

    #[test]
    fn test_range_can_cross_shards() {
        let mut map = ShardedMap::new(8, 8, 8);
        map.insert(1, 90, 1);
        map.insert(2, 10, 2);
        map.insert(2, 60, 3);
        map.insert(3, 5, 4);
        map.insert(4, 1, 5);

        let mut cursor = map.range(1, 80, 3, 7);
        let mut seen = Vec::new();
        while cursor.valid() {
            seen.push(cursor.value());
            cursor.next();
        }
        // shard 1 from key 80, shard 2 in full, shard 3 up to key 7
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_range_between_keys() {
        let mut map = ShardedMap::new(4, 8, 8);
        map.insert(0, 10, 1);
        map.insert(0, 100, 2);
        let cursor = map.range(0, 11, 0, 99);
        assert!(!cursor.valid());
    }

    #[test]
    fn test_page_splits_keep_order() {
        let mut map = ShardedMap::new(2, 8, 8);
        // descending inserts force front insertions and splits
        for key in (0..2000u64).rev() {
            map.insert(0, key, key + 7);
        }
        assert_eq!(map.len(), 2000);
        let mut cursor = map.range(0, 0, 0, u64::MAX);
        let mut expected = 0u64;
        while cursor.valid() {
            assert_eq!(cursor.key(), expected);
            assert_eq!(cursor.value(), expected + 7);
            cursor.next();
            expected += 1;
        }
        assert_eq!(expected, 2000);
    }

    #[test]
    fn test_narrow_widths_pack_and_compare() {
        let mut map = ShardedMap::new(4, 5, 5);
        let max40 = (1u64 << 40) - 1;
        map.insert(0, max40, max40 - 1);
        map.insert(0, 1, 2);
        assert_eq!(map.get(0, max40), Some(max40 - 1));
        let (cursor, found) = map.seek(0, 2);
        assert!(!found);
        assert_eq!(cursor.key(), max40);
    }

    #[test]
    #[should_panic(expected = "key wider")]
    fn test_oversized_key_is_rejected() {
        let mut map = ShardedMap::new(4, 4, 4);
        map.insert(0, 1 << 32, 0);
    }
}
