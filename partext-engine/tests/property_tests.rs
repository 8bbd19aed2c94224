//! Property tests for segmentation, partitioning and reassembly

use partext_engine::*;
use proptest::prelude::*;
use std::io::Cursor;

fn small_engine(read_size: usize, reserve_size: usize) -> EngineConfig {
    EngineConfig {
        read_size,
        reserve_size,
        queue_capacity: 2,
        ..EngineConfig::default()
    }
}

/// Input up to and including its last newline
fn terminated_prefix(input: &str) -> &str {
    match input.rfind('\n') {
        Some(pos) => &input[..=pos],
        None => "",
    }
}

proptest! {
    #[test]
    fn blocks_reproduce_input(
        input in "[a-c>\n]{0,300}",
        read_size in 1usize..40,
        reserve_size in 1usize..20,
    ) {
        let config = small_engine(read_size, reserve_size);
        let blocks: Vec<LineBlock> =
            BlockReader::with_config(Cursor::new(input.clone()), &config, ErrorSink::discard())
                .collect();

        for block in &blocks {
            prop_assert!(block.ends_with(b"\n"));
        }
        let joined: Vec<u8> = blocks.iter().flat_map(|b| b.as_bytes().to_vec()).collect();
        prop_assert_eq!(joined, terminated_prefix(&input).as_bytes());
    }

    #[test]
    fn records_reproduce_blocks(
        input in "(>?[a-z ]{0,12}\n){0,40}",
        read_size in 4usize..64,
    ) {
        let pipeline = Pipeline::builder()
            .pattern(">")
            .buffer_sizes(read_size, 8)
            .queue_capacity(1)
            .build()
            .unwrap();
        let records = pipeline.partition(Cursor::new(input.clone())).unwrap();

        prop_assert_eq!(records.concat(), input.into_bytes());
        for record in records.iter().skip(1) {
            prop_assert!(record.starts_with(b">"));
        }
    }

    #[test]
    fn filters_commute_with_range(
        words in prop::collection::vec("(red|blue|green)", 1..30),
        min in 0usize..10,
        max in 0usize..30,
    ) {
        let records: Vec<Vec<u8>> = words.iter().map(|w| format!("#{w}\n").into_bytes()).collect();
        let base = RecordFilter { min, max, ..RecordFilter::default() };
        let content = RecordFilter {
            require: Some("e".to_string()),
            exclude: Some("blue".to_string()),
            ..base.clone()
        };

        let mut combined = IndexedFilter::new(&content, SearchOptions::default()).unwrap();
        let kept: Vec<Vec<u8>> = records
            .iter()
            .filter_map(|r| combined.accept(r.clone()))
            .map(|r| r.text)
            .collect();

        // range first, then content
        let mut range_only = IndexedFilter::new(&base, SearchOptions::default()).unwrap();
        let expected: Vec<Vec<u8>> = records
            .iter()
            .filter_map(|r| range_only.accept(r.clone()))
            .filter(|r| {
                let text = r.to_str_lossy();
                text.contains('e') && !text.contains("blue")
            })
            .map(|r| r.text)
            .collect();

        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn unshuffler_orders_any_permutation(
        order in Just((1usize..=60).collect::<Vec<_>>()).prop_shuffle(),
        heap_delay in 0usize..10,
    ) {
        let mut out = Vec::new();
        let mut unshuffler = Unshuffler::new(heap_delay);
        for index in &order {
            unshuffler.push(IndexedRecord::new(*index, index.to_string()), |t| out.push(t));
        }
        unshuffler.finish(|t| out.push(t));

        let expected: Vec<Vec<u8>> = (1..=60).map(|i| i.to_string().into_bytes()).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn unshuffler_flushes_past_gap_ascending(
        order in Just((1usize..=30).filter(|i| *i != 10).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let mut out: Vec<usize> = Vec::new();
        let mut unshuffler = Unshuffler::new(0);
        for index in &order {
            unshuffler.push(IndexedRecord::new(*index, index.to_string()), |t| {
                out.push(String::from_utf8(t).unwrap().parse().unwrap())
            });
        }
        unshuffler.finish(|t| out.push(String::from_utf8(t).unwrap().parse().unwrap()));

        let expected: Vec<usize> = (1..=30).filter(|i| *i != 10).collect();
        prop_assert_eq!(out, expected);
    }
}
