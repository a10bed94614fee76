//! Demonstration of the Watts-RMS pipeline on synthetic samples.
//!
//! This example shows how to:
//! 1. Create a plugin with a configured target
//! 2. Feed it rectified-sine millivolt samples for two CT channels
//! 3. Drain read cycles and inspect the derived readings
//!
//! Run with: cargo run --example feed_demo

use chrono::Utc;
use watts_rms_agent::{
    sample::{MetricIdentity, MetricSample},
    stats::create_shared_stats,
    TargetConfig, WattsRmsPlugin, VERSION,
};

fn main() {
    println!("Watts-RMS Agent - Feed Demo (v{VERSION})");
    println!("========================================");
    println!();

    let stats = create_shared_stats();
    let mut plugin = WattsRmsPlugin::new(stats.clone());
    plugin.create_target(TargetConfig {
        burden: 10.0,
        ac_volts: 120.0,
    });

    // Two channels with different load amplitudes, sampled over three
    // read cycles. Sample values swing negative on half-cycles; only the
    // positive peak survives the window.
    let channels = [("ct0", 500.0), ("ct1", 120.0)];

    for cycle in 1..=3 {
        println!("=== Read cycle {cycle} ===");

        for step in 0..600 {
            let phase = step as f64 * 0.0628;
            for (instance, amplitude) in channels {
                let identity = MetricIdentity::new("house", "ct_clamp", "voltage")
                    .with_type_instance(instance);
                let value = amplitude * (phase + 0.1 * cycle as f64).sin();
                plugin.ingest(&MetricSample::now(identity, value));
            }
        }

        let mut readings = plugin.read(Utc::now());
        readings.sort_by(|a, b| a.source.cmp(&b.source));
        for reading in readings {
            println!(
                "  {} [{}] -> {:.1} W",
                reading.source, reading.identity.type_instance, reading.watts
            );
        }
        println!();
    }

    println!("{}", stats.summary());
    println!();
    println!("Demo complete!");
}
