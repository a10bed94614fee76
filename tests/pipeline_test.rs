//! Integration tests for the sample-to-reading pipeline.

use chrono::Utc;
use std::io::Cursor;
use std::thread;
use watts_rms_agent::{
    core::{watts_from_peak, PEAK_SENTINEL},
    dispatch::{ChannelDispatcher, Dispatch},
    sample::feed,
    stats::create_shared_stats,
    MetricIdentity, MetricSample, TargetConfig, WattsRmsPlugin, PLUGIN_NAME,
};

fn identity(instance: &str) -> MetricIdentity {
    MetricIdentity::new("house", "ct_clamp", "voltage").with_type_instance(instance)
}

#[test]
fn test_golden_conversion_through_pipeline() {
    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    plugin.create_target(TargetConfig {
        burden: 10.0,
        ac_volts: 120.0,
    });

    for value in [250.0, 1000.0, 400.0, -900.0] {
        plugin.ingest(&MetricSample::now(identity("ct0"), value));
    }

    let readings = plugin.read(Utc::now());
    assert_eq!(readings.len(), 1);

    let reading = &readings[0];
    assert_eq!(reading.source, "house/ct_clamp/voltage-ct0");
    assert!((reading.watts - 8_485_200.0).abs() < 1e-3, "got {}", reading.watts);
    assert_eq!(reading.identity.type_instance, format!("ct0-{PLUGIN_NAME}"));
    assert_eq!(reading.interval_ms, 0);
}

#[test]
fn test_concurrent_ingest_keeps_maximum() {
    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    let target = plugin.create_target(TargetConfig {
        burden: 10.0,
        ac_volts: 120.0,
    });

    let threads = 8;
    let per_thread = 100;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let target = target.clone();
            thread::spawn(move || {
                for i in 0..per_thread {
                    let value = (t * per_thread + i) as f64;
                    target.ingest(MetricSample::now(identity("ct0"), value));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("ingest thread");
    }

    let readings = plugin.read(Utc::now());
    assert_eq!(readings.len(), 1);

    let max = (threads * per_thread - 1) as f64;
    let expected = watts_from_peak(max, 10.0, 120.0);
    assert_eq!(readings[0].watts, expected);
}

#[test]
fn test_double_drain_emits_sentinel_readings() {
    let config = TargetConfig {
        burden: 10.0,
        ac_volts: 120.0,
    };
    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    plugin.create_target(config.clone());
    plugin.ingest(&MetricSample::now(identity("ct0"), 312.0));

    let first = plugin.read(Utc::now());
    assert_eq!(first.len(), 1);

    // A drain with no intervening samples still emits every source, with
    // the sentinel showing through the conversion.
    let second = plugin.read(Utc::now());
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].source, first[0].source);
    assert_eq!(
        second[0].watts,
        watts_from_peak(PEAK_SENTINEL, config.burden, config.ac_volts)
    );
}

#[test]
fn test_new_sources_resume_after_drain() {
    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    plugin.create_target(TargetConfig {
        burden: 0.0,
        ac_volts: 120.0,
    });

    plugin.ingest(&MetricSample::now(identity("ct0"), 9.0));
    plugin.read(Utc::now());

    // Negative half-cycle values must still win over the drained floor.
    plugin.ingest(&MetricSample::now(identity("ct0"), -4.5));
    let readings = plugin.read(Utc::now());
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].watts, watts_from_peak(-4.5, 0.0, 120.0));
}

#[test]
fn test_readings_flow_through_channel_dispatcher() {
    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    plugin.create_target(TargetConfig::default());

    plugin.ingest(&MetricSample::now(identity("ct0"), 1.0));
    plugin.ingest(&MetricSample::now(identity("ct1"), 2.0));

    let (sender, receiver) = crossbeam_channel::unbounded();
    let dispatcher = ChannelDispatcher::new(sender);
    for reading in plugin.read(Utc::now()) {
        dispatcher.dispatch(&reading).expect("dispatch");
    }

    let mut sources: Vec<String> = receiver.try_iter().map(|r| r.source).collect();
    sources.sort();
    assert_eq!(
        sources,
        vec![
            "house/ct_clamp/voltage-ct0".to_string(),
            "house/ct_clamp/voltage-ct1".to_string(),
        ]
    );
}

#[test]
fn test_feed_to_reading_end_to_end() {
    let input = concat!(
        r#"{"host":"house","plugin":"ct_clamp","type":"voltage","type_instance":"ct0","value":100.0}"#,
        "\n",
        "this line is garbage\n",
        r#"{"host":"house","plugin":"ct_clamp","type":"voltage","type_instance":"ct0","value":300.0}"#,
        "\n",
        r#"{"host":"house","plugin":"ct_clamp","type":"voltage","type_instance":"ct0","value":200.0}"#,
        "\n",
    );

    let (sender, receiver) = feed::channel();
    feed::spawn_reader(Cursor::new(input), sender)
        .join()
        .expect("reader thread");

    let mut plugin = WattsRmsPlugin::new(create_shared_stats());
    plugin.create_target(TargetConfig {
        burden: 10.0,
        ac_volts: 120.0,
    });
    for sample in receiver.iter() {
        plugin.ingest(&sample);
    }

    let readings = plugin.read(Utc::now());
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].watts, watts_from_peak(300.0, 10.0, 120.0));
}
