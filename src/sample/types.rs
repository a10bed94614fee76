//! Sample and reading types at the agent's pipeline boundary.
//!
//! A `MetricSample` is one scalar observation delivered by the host pipeline;
//! a `PowerReading` is one derived Watts-RMS value handed back out. The
//! metric identity travels through the pipeline unchanged except for the
//! type-instance suffix stamped on derived output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one metric series, collectd-style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricIdentity {
    /// Host the sample originated from
    #[serde(default)]
    pub host: String,
    /// Plugin that produced the sample
    pub plugin: String,
    /// Plugin instance (empty when the plugin has a single instance)
    #[serde(default)]
    pub plugin_instance: String,
    /// Data-set type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Type instance distinguishing channels within the type
    #[serde(default)]
    pub type_instance: String,
}

impl MetricIdentity {
    /// Create an identity with empty plugin and type instances.
    pub fn new(
        host: impl Into<String>,
        plugin: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            plugin: plugin.into(),
            plugin_instance: String::new(),
            type_name: type_name.into(),
            type_instance: String::new(),
        }
    }

    pub fn with_plugin_instance(mut self, instance: impl Into<String>) -> Self {
        self.plugin_instance = instance.into();
        self
    }

    pub fn with_type_instance(mut self, instance: impl Into<String>) -> Self {
        self.type_instance = instance.into();
        self
    }

    /// Source key identifying this series:
    /// `host/plugin-pluginInstance/type-typeInstance`, with empty instance
    /// parts omitted. Stable for the life of the process once first seen.
    pub fn source_key(&self) -> String {
        let mut key = String::with_capacity(
            self.host.len()
                + self.plugin.len()
                + self.plugin_instance.len()
                + self.type_name.len()
                + self.type_instance.len()
                + 4,
        );
        key.push_str(&self.host);
        key.push('/');
        key.push_str(&self.plugin);
        if !self.plugin_instance.is_empty() {
            key.push('-');
            key.push_str(&self.plugin_instance);
        }
        key.push('/');
        key.push_str(&self.type_name);
        if !self.type_instance.is_empty() {
            key.push('-');
            key.push_str(&self.type_instance);
        }
        key
    }
}

/// One inbound scalar sample.
///
/// Values are raw millivolt readings and may be negative (one half-cycle of
/// an AC waveform); peak tracking compares the signed value as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(flatten)]
    pub identity: MetricIdentity,
    /// Observed value in millivolts
    pub value: f64,
    /// Observation time, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub time: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(identity: MetricIdentity, value: f64, time: DateTime<Utc>) -> Self {
        Self {
            identity,
            value,
            time,
        }
    }

    /// Sample stamped with the current time.
    pub fn now(identity: MetricIdentity, value: f64) -> Self {
        Self::new(identity, value, Utc::now())
    }
}

/// One derived Watts-RMS reading for a source's window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerReading {
    /// Source key of the series the reading was derived from
    pub source: String,
    /// Identity copied from the winning sample, type instance suffixed to
    /// mark the reading as derived output
    #[serde(flatten)]
    pub identity: MetricIdentity,
    /// Derived power in Watts
    pub watts: f64,
    /// Window boundary, epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    /// Always 0: an instantaneous reading, not a rate over an interval
    pub interval_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_full_identity() {
        let identity = MetricIdentity::new("house", "ct_clamp", "voltage")
            .with_plugin_instance("panel0")
            .with_type_instance("ct3");
        assert_eq!(identity.source_key(), "house/ct_clamp-panel0/voltage-ct3");
    }

    #[test]
    fn test_source_key_omits_empty_instances() {
        let identity = MetricIdentity::new("house", "ct_clamp", "voltage");
        assert_eq!(identity.source_key(), "house/ct_clamp/voltage");
    }

    #[test]
    fn test_sample_parses_flat_json() {
        let sample: MetricSample = serde_json::from_str(
            r#"{"host":"house","plugin":"ct_clamp","type":"voltage","type_instance":"ct0","value":412.5,"time":1700000000000}"#,
        )
        .expect("valid sample");
        assert_eq!(sample.identity.source_key(), "house/ct_clamp/voltage-ct0");
        assert_eq!(sample.value, 412.5);
        assert_eq!(sample.time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_sample_time_defaults_to_now() {
        let sample: MetricSample = serde_json::from_str(
            r#"{"plugin":"ct_clamp","type":"voltage","value":1.0}"#,
        )
        .expect("valid sample");
        assert!((Utc::now() - sample.time).num_seconds() < 5);
        assert!(sample.identity.host.is_empty());
    }

    #[test]
    fn test_reading_serializes_epoch_millis() {
        let identity = MetricIdentity::new("house", "ct_clamp", "voltage");
        let time = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
        let reading = PowerReading {
            source: identity.source_key(),
            identity,
            watts: 42.0,
            time,
            interval_ms: 0,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&reading).unwrap()).unwrap();
        assert_eq!(json["time"], 1_700_000_000_000i64);
        assert_eq!(json["interval_ms"], 0);
        assert_eq!(json["type"], "voltage");
    }
}
