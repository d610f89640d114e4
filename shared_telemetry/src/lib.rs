#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured telemetry shared across the GenSea insight stack: JSONL file
//! sink plus a bounded in-memory ring of recent records.

use std::{
    collections::VecDeque,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
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

/// One structured telemetry record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Emission timestamp.
    pub timestamp: DateTime<Utc>,
    /// Component that emitted the record (e.g. `insight.runtime`).
    pub source: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Structured fields (metric values, counts, ids).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TelemetryRecord {
    /// Creates a record with empty fields.
    #[must_use]
    pub fn new(source: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attaches structured fields. A non-object value is stored under the
    /// `"value"` key.
    #[must_use]
    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        match fields {
            serde_json::Value::Object(map) => self.fields = map,
            serde_json::Value::Null => {}
            other => {
                self.fields.insert("value".into(), other);
            }
        }
        self
    }
}

/// Append-only JSONL sink.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonlSink {
    /// Creates or opens the sink at the given path, creating parent
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

    /// Appends one record as a JSON line.
    pub fn append(&self, record: &TelemetryRecord) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the sink path (useful for tests).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Telemetry facade: fans records out to the optional JSONL sink and keeps
/// the most recent ones in memory for dashboards.
#[derive(Debug, Clone)]
pub struct Telemetry {
    source: String,
    sink: Option<Arc<JsonlSink>>,
    ring: Arc<RwLock<VecDeque<TelemetryRecord>>>,
    capacity: usize,
}

impl Telemetry {
    /// Default ring capacity.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a telemetry handle for the named component.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sink: None,
            ring: Arc::new(RwLock::new(VecDeque::with_capacity(Self::DEFAULT_CAPACITY))),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Attaches a durable JSONL sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<JsonlSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Overrides the in-memory ring capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Emits a record and returns it.
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        fields: serde_json::Value,
    ) -> Result<TelemetryRecord> {
        let record = TelemetryRecord::new(self.source.clone(), level, message).with_fields(fields);
        {
            let mut ring = self.ring.write();
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(record.clone());
        }
        if let Some(sink) = &self.sink {
            sink.append(&record)?;
        }
        Ok(record)
    }

    /// Returns the most recent `limit` records, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<TelemetryRecord> {
        let ring = self.ring.read();
        ring.iter().rev().take(limit).cloned().collect()
    }
}
