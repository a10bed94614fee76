//! Shared per-source peak table.
//!
//! Ingestion folds samples into per-source records while the periodic read
//! cycle drains them; both sides go through the table's per-key entry guard,
//! so an update and a window reset for the same source never interleave.
//! Sources are registered on first sight and never evicted: the table grows
//! with source cardinality for the life of the process.

use crate::sample::types::{MetricIdentity, MetricSample};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Floor value a record is reset to when a window is drained. Any finite
/// sample value, negative half-cycle readings included, compares above it.
pub const PEAK_SENTINEL: f64 = f64::MIN;

/// Per-source mutable state: the running peak for the current window plus
/// the metadata of the sample that set it.
///
/// `value` is monotonically non-decreasing between resets and is reset to
/// [`PEAK_SENTINEL`] exactly once per window.
#[derive(Debug, Clone)]
pub struct PeakRecord {
    value: f64,
    identity: MetricIdentity,
    last_update: DateTime<Utc>,
}

impl PeakRecord {
    fn new(sample: MetricSample) -> Self {
        Self {
            value: sample.value,
            identity: sample.identity,
            last_update: sample.time,
        }
    }

    fn replace(&mut self, sample: MetricSample) {
        self.value = sample.value;
        self.identity = sample.identity;
        self.last_update = sample.time;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn identity(&self) -> &MetricIdentity {
        &self.identity
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Take the current window's peak out of the record and reset the stored
    /// value to the sentinel floor. Metadata is left in place until the next
    /// sample overwrites it.
    pub fn take_window(&mut self) -> WindowPeak {
        let peak = WindowPeak {
            value: self.value,
            identity: self.identity.clone(),
        };
        self.value = PEAK_SENTINEL;
        peak
    }
}

/// A drained per-source peak, detached from the live record.
#[derive(Debug, Clone)]
pub struct WindowPeak {
    pub value: f64,
    pub identity: MetricIdentity,
}

/// Concurrent map from source key to peak record.
#[derive(Debug, Default)]
pub struct PeakTable {
    records: DashMap<String, PeakRecord>,
}

impl PeakTable {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Fold a sample into its source's record. Returns true when the sample
    /// registered a brand-new source.
    ///
    /// Replacement is strictly greater-than on the raw signed value; a tie
    /// keeps the record (and its metadata) already in place. The entry guard
    /// makes the compare-and-replace atomic per key.
    pub fn fold(&self, sample: MetricSample) -> bool {
        match self.records.entry(sample.identity.source_key()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if sample.value > record.value {
                    record.replace(sample);
                }
                false
            }
            Entry::Vacant(vacant) => {
                tracing::debug!(source = %vacant.key(), "registering newly targeted source");
                vacant.insert(PeakRecord::new(sample));
                true
            }
        }
    }

    /// Visit every record's window peak, resetting each record as it is
    /// taken. Each entry is visited exactly once; sources registered while
    /// the drain is running may land in this window or the next.
    pub fn drain_each<F>(&self, mut visit: F)
    where
        F: FnMut(&str, WindowPeak),
    {
        for mut entry in self.records.iter_mut() {
            let peak = entry.value_mut().take_window();
            visit(entry.key(), peak);
        }
    }

    /// Number of sources currently tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current peak value for a source, if registered.
    pub fn peek(&self, source: &str) -> Option<f64> {
        self.records.get(source).map(|record| (*record).value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(instance: &str, value: f64) -> MetricSample {
        let identity = MetricIdentity::new("house", "ct_clamp", "voltage")
            .with_type_instance(instance);
        MetricSample::now(identity, value)
    }

    #[test]
    fn test_first_sample_registers_source() {
        let table = PeakTable::new();
        assert!(table.fold(sample("ct0", 12.0)));
        assert!(!table.fold(sample("ct0", 20.0)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.peek("house/ct_clamp/voltage-ct0"), Some(20.0));
    }

    #[test]
    fn test_lower_value_keeps_peak() {
        let table = PeakTable::new();
        table.fold(sample("ct0", 50.0));
        table.fold(sample("ct0", 49.9));
        assert_eq!(table.peek("house/ct_clamp/voltage-ct0"), Some(50.0));
    }

    #[test]
    fn test_tie_keeps_existing_metadata() {
        let table = PeakTable::new();
        let first = sample("ct0", 50.0);
        let first_time = first.time;
        table.fold(first);

        let mut tied = sample("ct0", 50.0);
        tied.time = first_time + chrono::Duration::seconds(5);
        table.fold(tied);

        let record = table.records.get("house/ct_clamp/voltage-ct0").unwrap();
        assert_eq!(record.last_update(), first_time);
    }

    #[test]
    fn test_negative_values_compare_signed() {
        let table = PeakTable::new();
        table.fold(sample("ct0", -100.0));
        table.fold(sample("ct0", -5.0));
        table.fold(sample("ct0", -50.0));
        assert_eq!(table.peek("house/ct_clamp/voltage-ct0"), Some(-5.0));
    }

    #[test]
    fn test_take_window_resets_to_sentinel() {
        let table = PeakTable::new();
        table.fold(sample("ct0", 75.0));

        let mut drained = Vec::new();
        table.drain_each(|source, peak| drained.push((source.to_string(), peak.value)));
        assert_eq!(drained, vec![("house/ct_clamp/voltage-ct0".to_string(), 75.0)]);

        // Key stays registered at the sentinel floor.
        assert_eq!(table.len(), 1);
        assert_eq!(table.peek("house/ct_clamp/voltage-ct0"), Some(PEAK_SENTINEL));
    }

    #[test]
    fn test_any_finite_value_replaces_sentinel() {
        let table = PeakTable::new();
        table.fold(sample("ct0", 75.0));
        table.drain_each(|_, _| {});

        table.fold(sample("ct0", -1.0e9));
        assert_eq!(table.peek("house/ct_clamp/voltage-ct0"), Some(-1.0e9));
    }

    #[test]
    fn test_drained_metadata_survives_reset() {
        let table = PeakTable::new();
        table.fold(sample("ct7", 10.0));
        table.drain_each(|_, _| {});

        let mut seen = Vec::new();
        table.drain_each(|_, peak| seen.push(peak.identity.type_instance.clone()));
        assert_eq!(seen, vec!["ct7".to_string()]);
    }
}
