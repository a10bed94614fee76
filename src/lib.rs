//! Watts-RMS Agent - derives RMS power readings from CT-clamp samples.
//!
//! This library tracks the peak of a stream of millivolt samples per sensor
//! channel and, on a periodic read cycle, converts each channel's peak into
//! an approximate Watts-RMS reading. It reimplements the windowed
//! peak-to-power reduction used to monitor current-transformer clamps wired
//! through burden resistors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Watts-RMS Agent                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌───────────┐             │
//! │  │ SampleFeed │──▶│  Ingestor  │──▶│ PeakTable │             │
//! │  │  (JSONL)   │   │ (per-key   │   │ (shared,  │             │
//! │  └────────────┘   │   max)     │   │ per-source│             │
//! │                   └────────────┘   └─────┬─────┘             │
//! │                                      read cycle              │
//! │                   ┌────────────┐   ┌─────▼─────┐             │
//! │                   │  Dispatch  │◀──│  Window   │             │
//! │                   │  (JSONL)   │   │  Reducer  │             │
//! │                   └────────────┘   └───────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Samples arrive continuously and fold into a per-source running peak; the
//! read cycle drains every source, emitting one reading per source and
//! resetting each peak to a sentinel floor for the next window.
//!
//! # Example
//!
//! ```no_run
//! use watts_rms_agent::{stats, MetricIdentity, MetricSample, TargetConfig, WattsRmsPlugin};
//!
//! let stats = stats::create_shared_stats();
//! let mut plugin = WattsRmsPlugin::new(stats);
//! plugin.create_target(TargetConfig {
//!     burden: 10.0,
//!     ac_volts: 120.0,
//! });
//!
//! let identity = MetricIdentity::new("house", "ct_clamp", "voltage");
//! plugin.ingest(&MetricSample::now(identity, 412.0));
//!
//! for reading in plugin.read(chrono::Utc::now()) {
//!     println!("{}: {:.1} W", reading.source, reading.watts);
//! }
//! ```

pub mod config;
pub mod core;
pub mod dispatch;
pub mod plugin;
pub mod sample;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, TargetConfig};
pub use core::{
    watts_from_peak, PeakTable, RmsTarget, SampleIngestor, WindowReducer, PEAK_SENTINEL,
};
pub use dispatch::{ChannelDispatcher, Dispatch, DispatchError, JsonLineDispatcher};
pub use plugin::{WattsRmsPlugin, PLUGIN_NAME};
pub use sample::{MetricIdentity, MetricSample, PowerReading};
pub use stats::{AgentStats, SharedAgentStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name_marks_derived_output() {
        assert_eq!(PLUGIN_NAME, "Watts-RMS");
    }
}
