//! Per-target wiring of the ingest and drain components.

use crate::config::TargetConfig;
use crate::core::ingest::SampleIngestor;
use crate::core::peaks::PeakTable;
use crate::core::reducer::WindowReducer;
use crate::sample::types::{MetricSample, PowerReading};
use crate::stats::SharedAgentStats;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One configured RMS target: an ingestor/reducer pair joined by a shared
/// peak table, with the target's immutable sensing parameters.
pub struct RmsTarget {
    ingestor: SampleIngestor,
    reducer: WindowReducer,
    peaks: Arc<PeakTable>,
}

impl RmsTarget {
    pub fn new(config: TargetConfig, stats: SharedAgentStats) -> Self {
        let peaks = Arc::new(PeakTable::new());
        Self {
            ingestor: SampleIngestor::new(peaks.clone(), stats.clone()),
            reducer: WindowReducer::new(config, peaks.clone(), stats),
            peaks,
        }
    }

    /// Fold one sample into this target's peak table.
    pub fn ingest(&self, sample: MetricSample) {
        self.ingestor.ingest(sample);
    }

    /// Drain this target's window at the boundary `now`.
    pub fn drain_window(&self, now: DateTime<Utc>) -> Vec<PowerReading> {
        self.reducer.drain_window(now)
    }

    pub fn config(&self) -> &TargetConfig {
        self.reducer.config()
    }

    /// Number of sources this target currently tracks.
    pub fn tracked_sources(&self) -> usize {
        self.peaks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::types::MetricIdentity;
    use crate::stats::create_shared_stats;

    #[test]
    fn test_target_tracks_and_drains() {
        let target = RmsTarget::new(
            TargetConfig {
                burden: 10.0,
                ac_volts: 120.0,
            },
            create_shared_stats(),
        );

        let identity = MetricIdentity::new("house", "ct_clamp", "voltage");
        target.ingest(MetricSample::now(identity.clone(), 100.0));
        target.ingest(MetricSample::now(identity, 300.0));
        assert_eq!(target.tracked_sources(), 1);

        let readings = target.drain_window(Utc::now());
        assert_eq!(readings.len(), 1);
        // 300/10 -> x1000 -> x0.7071 -> x120
        assert!((readings[0].watts - 2_545_560.0).abs() < 1e-3);
    }
}
