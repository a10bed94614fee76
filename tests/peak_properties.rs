//! Property tests for the peak table under randomized interleavings.

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use watts_rms_agent::{
    core::{PeakTable, PEAK_SENTINEL},
    MetricIdentity, MetricSample,
};

fn sample(value: f64) -> MetricSample {
    let identity = MetricIdentity::new("house", "ct_clamp", "voltage").with_type_instance("ct0");
    MetricSample::now(identity, value)
}

const KEY: &str = "house/ct_clamp/voltage-ct0";

proptest! {
    /// The drained peak equals the maximum of all ingested values, no
    /// matter how the ingests interleave across threads.
    #[test]
    fn drained_peak_is_maximum_of_interleaved_ingests(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
        threads in 1usize..8,
    ) {
        let table = Arc::new(PeakTable::new());
        let chunk = values.len().div_ceil(threads);

        let handles: Vec<_> = values
            .chunks(chunk)
            .map(|chunk| {
                let table = table.clone();
                let chunk = chunk.to_vec();
                thread::spawn(move || {
                    for value in chunk {
                        table.fold(sample(value));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("ingest thread");
        }

        let expected = values.iter().copied().fold(f64::MIN, f64::max);

        let mut drained = Vec::new();
        table.drain_each(|_, peak| drained.push(peak.value));
        prop_assert_eq!(drained, vec![expected]);

        // The reset leaves the source registered at the sentinel floor.
        prop_assert_eq!(table.peek(KEY), Some(PEAK_SENTINEL));
    }

    /// After a drain, any finite value replaces the sentinel.
    #[test]
    fn any_finite_value_replaces_drained_record(value in -1.0e9f64..1.0e9) {
        let table = PeakTable::new();
        table.fold(sample(123.0));
        table.drain_each(|_, _| {});

        table.fold(sample(value));
        prop_assert_eq!(table.peek(KEY), Some(value));
    }

    /// Ingestion order never matters for the tracked peak.
    #[test]
    fn peak_is_order_independent(mut values in prop::collection::vec(-1.0e6f64..1.0e6, 1..32)) {
        let forward = PeakTable::new();
        for &value in &values {
            forward.fold(sample(value));
        }

        values.reverse();
        let reverse = PeakTable::new();
        for &value in &values {
            reverse.fold(sample(value));
        }

        prop_assert_eq!(forward.peek(KEY), reverse.peek(KEY));
    }
}
