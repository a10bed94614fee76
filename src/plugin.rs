//! Target registry and read-cycle fan-out.

use crate::config::{Config, TargetConfig};
use crate::core::target::RmsTarget;
use crate::sample::types::{MetricSample, PowerReading};
use crate::stats::SharedAgentStats;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Plugin name, appended to the type instance of every derived reading to
/// distinguish it from the raw metric it was computed from.
pub const PLUGIN_NAME: &str = "Watts-RMS";

/// Registry of configured RMS targets.
///
/// A full collectd deployment routes samples to targets through its filter
/// chains; running standalone, the agent hands every sample to every target.
pub struct WattsRmsPlugin {
    targets: Vec<Arc<RmsTarget>>,
    stats: SharedAgentStats,
}

impl WattsRmsPlugin {
    pub fn new(stats: SharedAgentStats) -> Self {
        Self {
            targets: Vec::new(),
            stats,
        }
    }

    /// Build a plugin with one target per configured entry. A config with no
    /// targets gets a single default target.
    pub fn from_config(config: &Config, stats: SharedAgentStats) -> Self {
        let mut plugin = Self::new(stats);
        if config.targets.is_empty() {
            plugin.create_target(TargetConfig::default());
        } else {
            for target in &config.targets {
                plugin.create_target(target.clone());
            }
        }
        plugin
    }

    /// Register a new target and return a handle to it.
    pub fn create_target(&mut self, config: TargetConfig) -> Arc<RmsTarget> {
        tracing::info!(
            burden = config.burden,
            ac_volts = config.ac_volts,
            "created RMS target"
        );
        let target = Arc::new(RmsTarget::new(config, self.stats.clone()));
        self.targets.push(target.clone());
        target
    }

    pub fn targets(&self) -> &[Arc<RmsTarget>] {
        &self.targets
    }

    /// Hand a sample to every registered target.
    pub fn ingest(&self, sample: &MetricSample) {
        for target in &self.targets {
            target.ingest(sample.clone());
        }
    }

    /// Run one read cycle: drain every target's window at `now` and collect
    /// the readings in target registration order.
    pub fn read(&self, now: DateTime<Utc>) -> Vec<PowerReading> {
        let mut readings = Vec::new();
        for target in &self.targets {
            readings.extend(target.drain_window(now));
        }
        readings
    }
}
