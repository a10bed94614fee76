//! Pipeline statistics.
//!
//! Cheap atomic counters shared by the ingest and drain paths, with optional
//! JSON persistence so counts survive agent restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current agent session.
#[derive(Debug)]
pub struct AgentStats {
    /// Samples folded into peak tables
    samples_ingested: AtomicU64,
    /// Brand-new sources registered
    sources_registered: AtomicU64,
    /// Read cycles completed
    windows_drained: AtomicU64,
    /// Readings produced by drains
    readings_emitted: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting counters
    persist_path: Option<PathBuf>,
}

impl AgentStats {
    pub fn new() -> Self {
        Self {
            samples_ingested: AtomicU64::new(0),
            sources_registered: AtomicU64::new(0),
            windows_drained: AtomicU64::new(0),
            readings_emitted: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Stats with persistence, picking up counters from a previous session.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::debug!("no previous stats loaded: {e}");
        }

        stats
    }

    pub fn record_sample(&self) {
        self.samples_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_source_registered(&self) {
        self.sources_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_drained(&self) {
        self.windows_drained.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_readings(&self, count: u64) {
        self.readings_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_ingested: self.samples_ingested.load(Ordering::Relaxed),
            sources_registered: self.sources_registered.load(Ordering::Relaxed),
            windows_drained: self.windows_drained.load(Ordering::Relaxed),
            readings_emitted: self.readings_emitted.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "Agent statistics:\n\
             - Samples ingested: {}\n\
             - Sources registered: {}\n\
             - Windows drained: {}\n\
             - Readings emitted: {}\n\
             - Session duration: {} seconds",
            snapshot.samples_ingested,
            snapshot.sources_registered,
            snapshot.windows_drained,
            snapshot.readings_emitted,
            snapshot.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let snapshot = self.snapshot();
            let persisted = PersistedStats {
                samples_ingested: snapshot.samples_ingested,
                sources_registered: snapshot.sources_registered,
                windows_drained: snapshot.windows_drained,
                readings_emitted: snapshot.readings_emitted,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.samples_ingested
                    .store(persisted.samples_ingested, Ordering::Relaxed);
                self.sources_registered
                    .store(persisted.sources_registered, Ordering::Relaxed);
                self.windows_drained
                    .store(persisted.windows_drained, Ordering::Relaxed);
                self.readings_emitted
                    .store(persisted.readings_emitted, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_ingested.store(0, Ordering::Relaxed);
        self.sources_registered.store(0, Ordering::Relaxed);
        self.windows_drained.store(0, Ordering::Relaxed);
        self.readings_emitted.store(0, Ordering::Relaxed);
    }
}

impl Default for AgentStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the pipeline counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub samples_ingested: u64,
    pub sources_registered: u64,
    pub windows_drained: u64,
    pub readings_emitted: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Counter format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    samples_ingested: u64,
    sources_registered: u64,
    windows_drained: u64,
    readings_emitted: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats handle.
pub type SharedAgentStats = Arc<AgentStats>;

/// Create a new shared stats handle.
pub fn create_shared_stats() -> SharedAgentStats {
    Arc::new(AgentStats::new())
}

/// Create a new shared stats handle with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedAgentStats {
    Arc::new(AgentStats::with_persistence(path))
}
