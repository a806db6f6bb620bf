//! Transaction id iteration over a log map range.

use crate::indexes::{BlockMap, SlotList, INLINE_LANES};
use crate::shard_map::MapCursor;
use crate::slots::{SlotArena, SlotVec};

/// The decoded slot list of the log entry under the cursor.
#[derive(Debug)]
enum ListState<'a> {
    Empty,
    Inline {
        len: usize,
        lanes: [u32; INLINE_LANES],
    },
    Spilled {
        vec: &'a SlotVec,
        first: usize,
        len: usize,
    },
}

impl ListState<'_> {
    fn len(&self) -> usize {
        match *self {
            ListState::Empty => 0,
            ListState::Inline { len, .. } => len,
            ListState::Spilled { len, .. } => len,
        }
    }

    fn slot(&self, pos: usize) -> u32 {
        match *self {
            ListState::Empty => unreachable!("empty list has no slots"),
            ListState::Inline { lanes, .. } => lanes[pos],
            ListState::Spilled { vec, first, .. } => vec.get(first + pos),
        }
    }
}

/// Cursor yielding 56-bit transaction ids, `(height << 24) | slot`, in
/// strictly ascending order.
///
/// Walks the underlying log map range one entry at a time and expands
/// each entry's slot list, inline or spilled. Also usable as a plain
/// [`Iterator`].
#[derive(Debug)]
pub struct TxIdIter<'a> {
    blocks: &'a BlockMap,
    arena: &'a SlotArena,
    cursor: MapCursor<'a>,
    list: ListState<'a>,
    pos: usize,
}

impl<'a> TxIdIter<'a> {
    pub(crate) fn new(blocks: &'a BlockMap, arena: &'a SlotArena, cursor: MapCursor<'a>) -> Self {
        let mut iter = TxIdIter {
            blocks,
            arena,
            cursor,
            list: ListState::Empty,
            pos: 0,
        };
        iter.reload();
        iter.settle();
        iter
    }

    pub fn valid(&self) -> bool {
        self.cursor.valid() && self.pos < self.list.len()
    }

    /// Transaction id under the cursor; `u64::MAX` when invalid.
    pub fn value(&self) -> u64 {
        if !self.valid() {
            return u64::MAX;
        }
        let height = u64::from(self.cursor.key() as u32);
        (height << 24) | u64::from(self.list.slot(self.pos))
    }

    /// Step to the next transaction id, moving to the next log entry
    /// when the current list is exhausted.
    pub fn advance(&mut self) {
        if !self.valid() {
            return;
        }
        self.pos += 1;
        self.settle();
    }

    /// Decode the list under the cursor into `self.list`.
    fn reload(&mut self) {
        self.pos = 0;
        self.list = ListState::Empty;
        if !self.cursor.valid() {
            return;
        }
        let height = self.cursor.key() as u32;
        match SlotList::decode(self.cursor.value()) {
            SlotList::Inline { len, lanes } => {
                self.list = ListState::Inline {
                    len: len as usize,
                    lanes,
                };
            }
            SlotList::Spilled { base } => {
                let (blocks, arena) = (self.blocks, self.arena);
                let vec = blocks
                    .find(height)
                    .and_then(|entry| arena.get(entry.handle));
                debug_assert!(vec.is_some(), "spilled log entry without a block vector");
                if let Some(vec) = vec {
                    let base = base as usize;
                    self.list = ListState::Spilled {
                        vec,
                        first: base + 1,
                        len: vec.get(base) as usize,
                    };
                }
            }
        }
    }

    /// Skip forward until positioned on a slot or out of entries.
    fn settle(&mut self) {
        while self.pos >= self.list.len() && self.cursor.valid() {
            self.cursor.next();
            self.reload();
        }
    }
}

impl Iterator for TxIdIter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if !self.valid() {
            return None;
        }
        let value = self.value();
        self.advance();
        Some(value)
    }
}
