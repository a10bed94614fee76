//! Window drain: per-source peaks into Watts-RMS readings.

use crate::config::TargetConfig;
use crate::core::convert::watts_from_peak;
use crate::core::peaks::{PeakTable, WindowPeak};
use crate::plugin::PLUGIN_NAME;
use crate::sample::types::PowerReading;
use crate::stats::SharedAgentStats;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Drains the shared peak table into one reading per tracked source.
///
/// Driven by a single periodic read cycle: drains never overlap each other
/// but do run concurrently with ongoing ingestion.
pub struct WindowReducer {
    config: TargetConfig,
    peaks: Arc<PeakTable>,
    stats: SharedAgentStats,
}

impl WindowReducer {
    pub fn new(config: TargetConfig, peaks: Arc<PeakTable>, stats: SharedAgentStats) -> Self {
        Self {
            config,
            peaks,
            stats,
        }
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Produce one reading per tracked source at the window boundary `now`,
    /// resetting each record's value to the sentinel floor as it is taken.
    ///
    /// Sources stay registered across drains. A source that saw no samples
    /// since the last drain still emits a reading, with the sentinel showing
    /// through the conversion.
    pub fn drain_window(&self, now: DateTime<Utc>) -> Vec<PowerReading> {
        let mut readings = Vec::with_capacity(self.peaks.len());
        self.peaks.drain_each(|source, peak| {
            readings.push(self.reading_for(source, peak, now));
        });

        self.stats.record_window_drained();
        self.stats.record_readings(readings.len() as u64);
        readings
    }

    fn reading_for(&self, source: &str, peak: WindowPeak, now: DateTime<Utc>) -> PowerReading {
        let WindowPeak {
            value,
            mut identity,
        } = peak;
        identity.type_instance = format!("{}-{PLUGIN_NAME}", identity.type_instance);

        PowerReading {
            source: source.to_string(),
            identity,
            watts: watts_from_peak(value, self.config.burden, self.config.ac_volts),
            time: now,
            interval_ms: 0,
        }
    }
}
