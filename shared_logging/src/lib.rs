#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging sinks shared across the workspace.

use std::{
    collections::VecDeque,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

/// Structured log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Component emitting the event.
    pub component: String,
    /// Severity.
    pub level: LogLevel,
    /// Dotted event name, e.g. `summarizer.reduce.pass`.
    pub message: String,
    /// Arbitrary JSON payload with event fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    /// Creates an event with the provided info and empty fields.
    #[must_use]
    pub fn new(component: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            component: component.into(),
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attaches fields taken from a JSON object value.
    #[must_use]
    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = fields {
            self.fields = map;
        }
        self
    }
}

/// Destination accepting structured log events.
pub trait LogSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &LogEvent) -> Result<()>;
}

/// Append-only JSON-lines file sink.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonlSink {
    /// Creates or opens a sink at the desired path, creating parent
    /// directories as needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Returns the underlying file path (useful for tests).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonlSink {
    fn record(&self, event: &LogEvent) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Bounded in-memory sink retaining the most recent events.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemorySink {
    /// Creates a sink retaining at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns a copy of the retained events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, event: &LogEvent) -> Result<()> {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn jsonl_sink_writes_json_lines() {
        let dir = tempdir().unwrap();
        let sink = JsonlSink::new(dir.path().join("test.log")).unwrap();
        let event = LogEvent::new("summarizer", LogLevel::Info, "summarizer.start")
            .with_fields(json!({ "articles": 2 }));
        sink.record(&event).unwrap();
        let content = fs::read_to_string(sink.path()).unwrap();
        assert!(content.contains("\"message\":\"summarizer.start\""));
        assert!(content.contains("\"articles\":2"));
    }

    #[test]
    fn memory_sink_drops_oldest_beyond_capacity() {
        let sink = MemorySink::new(2);
        for i in 0..3 {
            sink.record(&LogEvent::new("t", LogLevel::Debug, format!("event.{i}")))
                .unwrap();
        }
        let events = sink.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "event.1");
        assert_eq!(events[1].message, "event.2");
    }
}
