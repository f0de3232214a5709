//! Property tests for the binary metric codecs.

use interop_lib::constants::MetricGroup;
use interop_lib::errors::InteropError;
use interop_lib::io::{calculate_buffer_size, read_from_buffer, write_to_vec};
use interop_lib::metrics::{ErrorMetric, IndexInfo, IndexMetric, MetricSet, QCollapsedMetric};
use interop_lib::run_metrics::RunMetrics;
use proptest::prelude::*;

fn error_set(version: u8, rates: &[f32], tile: u32) -> MetricSet<ErrorMetric> {
    let mut set = MetricSet::with_version(version);
    for (cycle, &rate) in (1..).zip(rates) {
        set.insert(ErrorMetric::new(1, tile, cycle, rate));
    }
    set
}

fn index_set(version: u8, entries: &[(String, String, u32)]) -> MetricSet<IndexMetric> {
    let mut set = MetricSet::with_version(version);
    for (tile, (seq, sample, count)) in (1101..).zip(entries) {
        set.insert(IndexMetric::new(1, tile, 1, vec![IndexInfo::new(seq.clone(), sample.clone(), "proj", u64::from(*count))]));
    }
    set
}

proptest! {
    // Property: encoding then decoding an error set gives the same set, and
    // the encoded length is exactly the precomputed buffer size.
    #[test]
    fn proptest_error_sets_survive_encoding(
        version in prop::sample::select(vec![3_u8, 4]),
        rates in prop::collection::vec(0.0_f32..100.0, 0..40),
        tile in 1101_u32..2399,
    ) {
        let set = error_set(version, &rates, tile);
        let bytes = write_to_vec(&set).unwrap();
        prop_assert_eq!(bytes.len(), calculate_buffer_size(&set).unwrap());

        let mut decoded = MetricSet::<ErrorMetric>::new();
        read_from_buffer(&bytes, &mut decoded).unwrap();
        prop_assert_eq!(decoded, set);
    }

    // Property: a fixed-size stream cut inside a record is reported as
    // incomplete, never decoded partially.
    #[test]
    fn proptest_cut_records_are_incomplete(
        count in 1_usize..20,
        cut in 1_usize..12,
    ) {
        let rates = vec![0.5; count];
        let bytes = write_to_vec(&error_set(4, &rates, 1101)).unwrap();
        let end = bytes.len() - cut;
        let mut decoded = MetricSet::<ErrorMetric>::new();
        let result = read_from_buffer(&bytes[..end], &mut decoded);
        prop_assert!(
            matches!(result, Err(InteropError::IncompleteFile { .. })),
            "expected IncompleteFile, got {:?}",
            result
        );
    }

    // Property: variable-length index streams round trip with any strings.
    #[test]
    fn proptest_index_sets_survive_encoding(
        version in prop::sample::select(vec![1_u8, 2]),
        entries in prop::collection::vec(("[ACGT]{4,8}-[ACGT]{4,8}", "[a-z0-9_]{0,12}", any::<u32>()), 0..20),
    ) {
        let set = index_set(version, &entries);
        let bytes = write_to_vec(&set).unwrap();
        prop_assert_eq!(bytes.len(), calculate_buffer_size(&set).unwrap());

        let mut decoded = MetricSet::<IndexMetric>::new();
        read_from_buffer(&bytes, &mut decoded).unwrap();
        prop_assert_eq!(decoded, set);
    }

    // Property: collapsed Q-scores keep their counts in both layouts.
    #[test]
    fn proptest_collapsed_counts_survive_encoding(
        version in prop::sample::select(vec![2_u8, 6]),
        counts in prop::collection::vec((any::<u32>(), any::<u32>(), any::<u32>(), 0_u32..50), 1..30),
    ) {
        let mut set = MetricSet::with_version(version);
        for (cycle, &(q20, q30, total, median)) in (1..).zip(&counts) {
            set.insert(QCollapsedMetric::new(2, 1201, cycle, q20, q30, total, median));
        }
        let mut decoded = MetricSet::<QCollapsedMetric>::new();
        read_from_buffer(&write_to_vec(&set).unwrap(), &mut decoded).unwrap();
        prop_assert_eq!(decoded, set);
    }

    // Property: arbitrary bytes never panic the decoder of any group.
    #[test]
    fn proptest_arbitrary_bytes_do_not_panic(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut run = RunMetrics::default();
        for group in MetricGroup::ALL {
            let _ = run.read_metrics_from_buffer(group, &bytes);
        }
    }
}
