//! Telemetry helpers for the summarization pipeline.

use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonlSink, LogEvent, LogLevel, LogSink};

/// Builder for summarizer telemetry sinks.
pub struct SummarizerTelemetryBuilder {
    component: String,
    log_path: Option<PathBuf>,
    extra_sink: Option<Arc<dyn LogSink>>,
}

impl SummarizerTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            log_path: None,
            extra_sink: None,
        }
    }

    /// Sets the JSON-lines log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Adds a secondary sink (memory sink in tests, typically).
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.extra_sink = Some(sink);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<SummarizerTelemetry> {
        let mut sinks: Vec<Arc<dyn LogSink>> = Vec::new();
        if let Some(path) = self.log_path {
            sinks.push(Arc::new(JsonlSink::new(path)?));
        }
        if let Some(sink) = self.extra_sink {
            sinks.push(sink);
        }
        Ok(SummarizerTelemetry {
            inner: Arc::new(TelemetryInner {
                component: self.component,
                sinks,
            }),
        })
    }
}

/// Telemetry handle shared across pipeline components.
#[derive(Clone)]
pub struct SummarizerTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for SummarizerTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerTelemetry")
            .field("component", &self.inner.component)
            .finish()
    }
}

struct TelemetryInner {
    component: String,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl SummarizerTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(component: impl Into<String>) -> SummarizerTelemetryBuilder {
        SummarizerTelemetryBuilder::new(component)
    }

    /// Logs structured fields to every sink.
    pub fn log(&self, level: LogLevel, message: &str, fields: Value) -> Result<()> {
        let event =
            LogEvent::new(&self.inner.component, level, message).with_fields(fields);
        for sink in &self.inner.sinks {
            sink.record(&event)?;
        }
        Ok(())
    }
}
