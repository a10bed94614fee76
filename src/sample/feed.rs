//! JSON-lines sample ingress.
//!
//! The host pipeline delivers samples over a bounded channel; this module
//! provides the channel plus a reader that parses one JSON sample per line.
//! Malformed lines are rejected here, at the boundary, so the core never
//! sees them.

use crate::sample::types::MetricSample;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::thread::{self, JoinHandle};

/// Queue depth between the reader and the ingest loop.
pub const FEED_CAPACITY: usize = 10_000;

/// Create the bounded sample channel.
pub fn channel() -> (Sender<MetricSample>, Receiver<MetricSample>) {
    bounded(FEED_CAPACITY)
}

/// Read JSON-lines samples from `reader` until EOF or the receiver is gone.
///
/// Samples missing a metric identity or carrying a non-finite value are
/// rejected with a warning. Samples without a host are stamped with the
/// local hostname.
pub fn read_samples<R: BufRead>(reader: R, sender: &Sender<MetricSample>) {
    let default_host = local_hostname();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("sample feed read failed: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut sample: MetricSample = match serde_json::from_str(line) {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!("rejecting malformed sample line: {e}");
                continue;
            }
        };

        if sample.identity.plugin.is_empty() || sample.identity.type_name.is_empty() {
            tracing::warn!("rejecting sample without a metric identity");
            continue;
        }
        if !sample.value.is_finite() {
            tracing::warn!(source = %sample.identity.source_key(), "rejecting non-finite sample value");
            continue;
        }
        if sample.identity.host.is_empty() {
            sample.identity.host = default_host.clone();
        }

        if sender.send(sample).is_err() {
            break;
        }
    }
}

/// Spawn a thread running [`read_samples`]. The sender is dropped when the
/// reader finishes, which disconnects the channel and signals EOF.
pub fn spawn_reader<R>(reader: R, sender: Sender<MetricSample>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || read_samples(reader, &sender))
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}
