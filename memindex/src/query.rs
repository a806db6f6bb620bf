//! Multi-cursor intersection over the log maps.

use tracing::debug;

use crate::index::ArchiveIndex;
use crate::iter::TxIdIter;
use crate::types::{TxOffsetsQuery, MAX_UINT48};

/// Evaluate `addr AND topic_1 AND ... AND topic_k` over the query's
/// height range by merge-intersecting the per-criterion id cursors.
///
/// All cursors yield ascending ids. The first cursor is the pivot: the
/// others catch up to its value each round, a match is emitted when all
/// of them land on it, and the pivot then advances. Emitted offsets are
/// `-1` for ids absent from the tx index.
pub(crate) fn run(index: &ArchiveIndex, query: &TxOffsetsQuery) -> Vec<i64> {
    let mut cursors: Vec<TxIdIter<'_>> = Vec::new();
    if query.addr_hash != 0 && query.addr_hash <= MAX_UINT48 {
        cursors.push(index.addr_iterator(query.addr_hash, query.start_height, query.end_height));
    }
    for &topic in &query.topic_hashes {
        cursors.push(index.topic_iterator(topic, query.start_height, query.end_height));
    }
    if cursors.is_empty() {
        return Vec::new();
    }

    let mut offsets = Vec::new();
    loop {
        if !cursors.iter().all(TxIdIter::valid) {
            break;
        }
        let pivot = cursors[0].value();
        for cursor in &mut cursors[1..] {
            while cursor.valid() && cursor.value() < pivot {
                cursor.advance();
            }
        }
        if !cursors.iter().all(TxIdIter::valid) {
            break;
        }
        if cursors.iter().all(|cursor| cursor.value() == pivot) {
            let offset = index.offset_by_tx_id(pivot).map_or(-1, |off| off as i64);
            offsets.push(offset);
        }
        cursors[0].advance();
    }
    debug!(
        "tx offset query: addr {:#x}, {} topics, heights {}..={}, {} matches",
        query.addr_hash,
        query.topic_hashes.len(),
        query.start_height,
        query.end_height,
        offsets.len()
    );
    offsets
}
