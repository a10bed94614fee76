//! Sample ingestion component.

use crate::core::peaks::PeakTable;
use crate::sample::types::MetricSample;
use crate::stats::SharedAgentStats;
use std::sync::Arc;

/// Folds incoming samples into the shared peak table.
///
/// Safe to call from any number of threads; updates for the same source are
/// linearized by the table's per-key entry guard. Ingestion never fails: a
/// sample either registers a new source or competes for an existing peak.
#[derive(Clone)]
pub struct SampleIngestor {
    peaks: Arc<PeakTable>,
    stats: SharedAgentStats,
}

impl SampleIngestor {
    pub fn new(peaks: Arc<PeakTable>, stats: SharedAgentStats) -> Self {
        Self { peaks, stats }
    }

    /// Fold one sample into the running per-source peak.
    pub fn ingest(&self, sample: MetricSample) {
        if self.peaks.fold(sample) {
            self.stats.record_source_registered();
        }
        self.stats.record_sample();
    }
}
