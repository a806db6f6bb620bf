//! Intersection query behavior.

use archive_memindex::{ArchiveIndex, TxOffsetsQuery};
use std::collections::BTreeSet;

const ADDR_A: u64 = 0x0000_00AA_0000_0001;
const TOPIC_T: u64 = 0x0000_00BB_0000_0001;
const TOPIC_U: u64 = 0x0000_00BB_0000_0002;

fn query(
    index: &ArchiveIndex,
    addr_hash: u64,
    topics: &[u64],
    start_height: u32,
    end_height: u32,
) -> Vec<i64> {
    index.query_tx_offsets(&TxOffsetsQuery {
        addr_hash,
        topic_hashes: topics.to_vec(),
        start_height,
        end_height,
    })
}

/// Address at heights 100 and 102, topic at heights 100 and 101: only
/// the transaction at height 100 satisfies both.
#[test]
fn test_addr_and_topic_intersection() {
    let mut index = ArchiveIndex::new();
    index.add_addr2log(ADDR_A, 100, &[1]).unwrap();
    index.add_addr2log(ADDR_A, 102, &[1]).unwrap();
    index.add_topic2log(TOPIC_T, 100, &[1]).unwrap();
    index.add_topic2log(TOPIC_T, 101, &[1]).unwrap();
    index.add_tx((100 << 24) | 1, 0x500, 500).unwrap();
    index.add_tx((102 << 24) | 1, 0x700, 700).unwrap();

    assert_eq!(query(&index, ADDR_A, &[TOPIC_T], 100, 102), vec![500]);
}

#[test]
fn test_addr_only_and_topic_only() {
    let mut index = ArchiveIndex::new();
    index.add_addr2log(ADDR_A, 10, &[0, 1]).unwrap();
    index.add_topic2log(TOPIC_T, 10, &[1]).unwrap();
    index.add_tx(10 << 24, 0x900, 90).unwrap();
    index.add_tx((10 << 24) | 1, 0x901, 91).unwrap();

    // address criterion alone
    assert_eq!(query(&index, ADDR_A, &[], 0, 20), vec![90, 91]);
    // zero address skips the address cursor entirely
    assert_eq!(query(&index, 0, &[TOPIC_T], 0, 20), vec![91]);
    // no criteria at all: empty result
    assert!(query(&index, 0, &[], 0, 20).is_empty());
}

#[test]
fn test_missing_tx_mapping_yields_minus_one() {
    let mut index = ArchiveIndex::new();
    index.add_addr2log(ADDR_A, 5, &[1, 2]).unwrap();
    index.add_tx((5 << 24) | 2, 0x502, 52).unwrap();

    // (5 << 24) | 1 has no tx entry and must still appear, as -1
    assert_eq!(query(&index, ADDR_A, &[], 0, 10), vec![-1, 52]);
}

#[test]
fn test_height_range_bounds_are_closed() {
    let mut index = ArchiveIndex::new();
    for height in 10u32..=14 {
        index.add_addr2log(ADDR_A, height, &[1]).unwrap();
        index
            .add_tx((u64::from(height) << 24) | 1, 0x600 + u64::from(height), i64::from(height))
            .unwrap();
    }
    assert_eq!(query(&index, ADDR_A, &[], 11, 13), vec![11, 12, 13]);
    assert_eq!(query(&index, ADDR_A, &[], 14, 14), vec![14]);
    assert!(query(&index, ADDR_A, &[], 15, 20).is_empty());
}

#[test]
fn test_conjunction_of_two_topics() {
    let mut index = ArchiveIndex::new();
    // T matches slots {1, 2} at height 30, U matches {2, 3}
    index.add_topic2log(TOPIC_T, 30, &[1, 2]).unwrap();
    index.add_topic2log(TOPIC_U, 30, &[2, 3]).unwrap();
    for slot in 1u64..=3 {
        index
            .add_tx((30 << 24) | slot, 0x800 + slot, 800 + slot as i64)
            .unwrap();
    }
    assert_eq!(query(&index, 0, &[TOPIC_T, TOPIC_U], 30, 30), vec![802]);
    // conjunction order does not change the result
    assert_eq!(query(&index, 0, &[TOPIC_U, TOPIC_T], 30, 30), vec![802]);
}

#[test]
fn test_intersection_with_spilled_lists() {
    let mut index = ArchiveIndex::new();
    index.add_block(40, 0xB40, 0).unwrap();
    index.add_addr2log(ADDR_A, 40, &[0, 2, 4, 6, 8]).unwrap(); // spilled
    index.add_topic2log(TOPIC_T, 40, &[3, 4, 5]).unwrap(); // inline
    for slot in 0u64..10 {
        index
            .add_tx((40 << 24) | slot, 0xA00 + slot, slot as i64)
            .unwrap();
    }
    assert_eq!(query(&index, ADDR_A, &[TOPIC_T], 40, 40), vec![4]);
}

/// Intersecting is never broader than either single-criterion query.
#[test]
fn test_intersection_is_subset_of_each_criterion() {
    let mut index = ArchiveIndex::new();
    for height in 0u32..50 {
        if height % 2 == 0 {
            index.add_addr2log(ADDR_A, height, &[height % 3]).unwrap();
        }
        if height % 3 == 0 {
            index.add_topic2log(TOPIC_T, height, &[height % 3]).unwrap();
        }
        for slot in 0u64..3 {
            index
                .add_tx(
                    (u64::from(height) << 24) | slot,
                    (u64::from(height) << 8) | slot,
                    i64::from(height) * 10 + slot as i64,
                )
                .unwrap();
        }
    }

    let both: BTreeSet<i64> = query(&index, ADDR_A, &[TOPIC_T], 0, 50).into_iter().collect();
    let addr_only: BTreeSet<i64> = query(&index, ADDR_A, &[], 0, 50).into_iter().collect();
    let topic_only: BTreeSet<i64> = query(&index, 0, &[TOPIC_T], 0, 50).into_iter().collect();

    assert!(!both.is_empty());
    assert!(both.is_subset(&addr_only));
    assert!(both.is_subset(&topic_only));
    let expected: BTreeSet<i64> = addr_only.intersection(&topic_only).copied().collect();
    assert_eq!(both, expected);
}

#[test]
fn test_results_ascend_and_repeat_identically() {
    let mut index = ArchiveIndex::new();
    for height in [3u32, 1, 4, 1, 5, 9, 2, 6] {
        // duplicate heights overwrite the same entry, the rest accumulate
        index.add_addr2log(ADDR_A, height, &[0, 1]).unwrap();
        for slot in 0u64..2 {
            let _ = index.add_tx(
                (u64::from(height) << 24) | slot,
                (u64::from(height) << 16) | slot,
                i64::from(height) * 100 + slot as i64,
            );
        }
    }
    let first = query(&index, ADDR_A, &[], 0, 100);
    let second = query(&index, ADDR_A, &[], 0, 100);
    assert_eq!(first, second);
    // offsets ascend because ids ascend and offsets were assigned by height
    let mut sorted = first.clone();
    sorted.sort_unstable();
    assert_eq!(first, sorted);
    assert_eq!(first.len(), 14); // 7 distinct heights x 2 slots
}

#[test]
fn test_invalid_wide_address_hash_is_ignored() {
    let mut index = ArchiveIndex::new();
    index.add_topic2log(TOPIC_T, 1, &[1]).unwrap();
    index.add_tx((1 << 24) | 1, 0x111, 11).unwrap();
    // an address hash wider than 48 bits cannot match anything; the
    // topic criterion still applies
    let offsets = query(&index, 1 << 50, &[TOPIC_T], 0, 10);
    assert_eq!(offsets, vec![11]);
}
