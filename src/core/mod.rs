//! Core peak-tracking and windowed-reduction engine.
//!
//! This module contains:
//! - The shared per-source peak table and its sentinel-reset lifecycle
//! - Sample ingestion (per-key compare-and-replace)
//! - The window drain producing one Watts-RMS reading per source
//! - The peak-to-Watts conversion pipeline

pub mod convert;
pub mod ingest;
pub mod peaks;
pub mod reducer;
pub mod target;

// Re-export commonly used types
pub use convert::watts_from_peak;
pub use ingest::SampleIngestor;
pub use peaks::{PeakRecord, PeakTable, WindowPeak, PEAK_SENTINEL};
pub use reducer::WindowReducer;
pub use target::RmsTarget;
