//! Synthetic-load tool: builds a chain in memory, then measures lookup
//! and query throughput.

use archive_memindex::{hash48, ArchiveIndex, TxOffsetsQuery};
use std::env;
use std::time::Instant;

const TXS_PER_BLOCK: u32 = 8;
const ADDR_POOL: u64 = 64;
const TOPIC_POOL: u64 = 32;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let blocks: u32 = match args.get(1).map(|s| s.parse()) {
        None => 100_000,
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("Usage: {} [num-blocks] [num-queries]", args[0]);
            eprintln!();
            eprintln!("Builds a synthetic chain and reports index throughput.");
            std::process::exit(1);
        }
    };
    let queries: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);

    let mut index = ArchiveIndex::new();

    let started = Instant::now();
    let mut offset = 0u64;
    for height in 0..blocks {
        let block_hash = hash48(format!("block-{height}").as_bytes());
        index
            .add_block(height, block_hash, offset as i64)
            .expect("synthetic block hashes collide");
        offset += 4096;

        for slot in 0..TXS_PER_BLOCK {
            let id56 = (u64::from(height) << 24) | u64::from(slot);
            let tx_hash = hash48(format!("tx-{height}-{slot}").as_bytes());
            index
                .add_tx(id56, tx_hash, offset as i64)
                .expect("synthetic tx hashes collide");
            offset += 512;
        }

        // every address/topic sees a few transactions per block; one
        // address gets a long list to exercise the spill path
        let addr = hash48(format!("addr-{}", u64::from(height) % ADDR_POOL).as_bytes());
        let topic = hash48(format!("topic-{}", u64::from(height) % TOPIC_POOL).as_bytes());
        index.add_addr2log(addr, height, &[0, 1, 2]).unwrap();
        index.add_topic2log(topic, height, &[1, 2]).unwrap();
        if height % 97 == 0 {
            let spill_addr = hash48(b"addr-hot");
            let indices: Vec<u32> = (0..TXS_PER_BLOCK).collect();
            index.add_addr2log(spill_addr, height, &indices).unwrap();
        }
    }
    let build = started.elapsed();
    let stats = index.stats();
    println!("Build: {} blocks, {} txs in {:.2?}", stats.blocks, stats.txs, build);
    println!(
        "  log entries: {} addr / {} topic, {} slot vectors",
        stats.addr_log_entries, stats.topic_log_entries, stats.slot_vecs
    );

    let started = Instant::now();
    let mut found = 0u64;
    for i in 0..queries {
        let height = i % blocks;
        let slot = i % TXS_PER_BLOCK;
        let id56 = (u64::from(height) << 24) | u64::from(slot);
        if index.offset_by_tx_id(id56).is_some() {
            found += 1;
        }
    }
    let elapsed = started.elapsed();
    println!(
        "Point lookups: {queries} in {:.2?} ({:.0}/s), {found} hits",
        elapsed,
        f64::from(queries) / elapsed.as_secs_f64()
    );

    let started = Instant::now();
    let mut matches = 0usize;
    for i in 0..queries.min(1000) {
        let query = TxOffsetsQuery {
            addr_hash: hash48(format!("addr-{}", u64::from(i) % ADDR_POOL).as_bytes()),
            topic_hashes: vec![hash48(
                format!("topic-{}", u64::from(i) % TOPIC_POOL).as_bytes(),
            )],
            start_height: 0,
            end_height: blocks,
        };
        matches += index.query_tx_offsets(&query).len();
    }
    let elapsed = started.elapsed();
    println!(
        "Intersections: {} in {:.2?} ({:.0}/s), {matches} matched txs",
        queries.min(1000),
        elapsed,
        f64::from(queries.min(1000)) / elapsed.as_secs_f64()
    );
}
