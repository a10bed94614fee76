//! Outbound reading dispatch.
//!
//! The core never performs I/O; finished readings are handed to a
//! [`Dispatch`] implementation supplied by the embedder. The agent binary
//! uses the JSON-lines writer; tests and in-process embedders use the
//! channel dispatcher.

use crate::sample::types::PowerReading;
use crossbeam_channel::Sender;
use std::io::Write;
use std::sync::Mutex;

/// Sink for derived readings.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, reading: &PowerReading) -> Result<(), DispatchError>;
}

/// Writes readings as JSON lines, one object per reading.
///
/// Non-finite watts values (a window that never saw a sample) serialize as
/// JSON null.
pub struct JsonLineDispatcher<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineDispatcher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Dispatch for JsonLineDispatcher<W> {
    fn dispatch(&self, reading: &PowerReading) -> Result<(), DispatchError> {
        let json = serde_json::to_string(reading)
            .map_err(|e| DispatchError::Serialization(e.to_string()))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DispatchError::Io("writer lock poisoned".to_string()))?;
        writeln!(writer, "{json}").map_err(|e| DispatchError::Io(e.to_string()))
    }
}

/// Forwards readings over a channel.
pub struct ChannelDispatcher {
    sender: Sender<PowerReading>,
}

impl ChannelDispatcher {
    pub fn new(sender: Sender<PowerReading>) -> Self {
        Self { sender }
    }
}

impl Dispatch for ChannelDispatcher {
    fn dispatch(&self, reading: &PowerReading) -> Result<(), DispatchError> {
        self.sender
            .send(reading.clone())
            .map_err(|_| DispatchError::Closed)
    }
}

/// Dispatch errors.
#[derive(Debug)]
pub enum DispatchError {
    Serialization(String),
    Io(String),
    Closed,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Serialization(e) => write!(f, "Serialization error: {e}"),
            DispatchError::Io(e) => write!(f, "IO error: {e}"),
            DispatchError::Closed => write!(f, "Reading receiver is closed"),
        }
    }
}

impl std::error::Error for DispatchError {}
