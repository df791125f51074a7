//! Per-event structured log records.
//!
//! Every lifecycle or request event handled by a worker version gets an
//! [`EventLog`]. Records carry the event, the version and a correlation id,
//! are rendered as one JSON object, and leave through `tracing` under the
//! `edge` target so the host's subscriber decides where they go.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use edge_core::RequestId;
use serde::Serialize;
use serde_json::Value;

/// Worker event a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch,
    Push,
    #[serde(rename = "notificationclick")]
    NotificationClick,
}

impl fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
            Self::Push => "push",
            Self::NotificationClick => "notificationclick",
        })
    }
}

/// Severity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// One emitted record.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub severity: Severity,
    pub event: WorkerEvent,
    pub version: String,
    pub request_id: String,
    pub message: String,
    pub elapsed_us: u64,
    /// Sorted, so rendered records are stable.
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, Value>,
}

impl EventRecord {
    /// Render as a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

/// Log context for one event on one worker version.
#[derive(Debug, Clone)]
pub struct EventLog {
    event: WorkerEvent,
    version: String,
    request_id: RequestId,
    started: Instant,
}

impl EventLog {
    pub fn new(event: WorkerEvent, version: impl Into<String>, request_id: RequestId) -> Self {
        Self {
            event,
            version: version.into(),
            request_id,
            started: Instant::now(),
        }
    }

    pub fn event(&self) -> WorkerEvent {
        self.event
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn debug(&self, message: impl Into<String>) -> RecordBuilder<'_> {
        RecordBuilder::new(self, Severity::Debug, message.into())
    }

    pub fn info(&self, message: impl Into<String>) -> RecordBuilder<'_> {
        RecordBuilder::new(self, Severity::Info, message.into())
    }

    pub fn warn(&self, message: impl Into<String>) -> RecordBuilder<'_> {
        RecordBuilder::new(self, Severity::Warn, message.into())
    }
}

/// Collects fields for a record before it is emitted.
#[must_use = "records are only logged by `emit`"]
pub struct RecordBuilder<'a> {
    log: &'a EventLog,
    severity: Severity,
    message: String,
    fields: BTreeMap<&'static str, Value>,
}

impl<'a> RecordBuilder<'a> {
    fn new(log: &'a EventLog, severity: Severity, message: String) -> Self {
        Self {
            log,
            severity,
            message,
            fields: BTreeMap::new(),
        }
    }

    /// Attach a field. Later values for the same name replace earlier ones.
    pub fn field(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    pub fn build(self) -> EventRecord {
        EventRecord {
            severity: self.severity,
            event: self.log.event,
            version: self.log.version.clone(),
            request_id: self.log.request_id.to_string(),
            message: self.message,
            elapsed_us: self.log.started.elapsed().as_micros() as u64,
            fields: self.fields,
        }
    }

    pub fn emit(self) {
        let record = self.build();
        let line = record.to_json();
        match record.severity {
            Severity::Debug => tracing::debug!(target: "edge", event = %record.event, "{}", line),
            Severity::Info => tracing::info!(target: "edge", event = %record.event, "{}", line),
            Severity::Warn => tracing::warn!(target: "edge", event = %record.event, "{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(event: WorkerEvent) -> EventLog {
        EventLog::new(event, "v2", RequestId::from_string("req-1"))
    }

    #[test]
    fn test_record_carries_event_context() {
        let record = log(WorkerEvent::Fetch)
            .info("served")
            .field("status", "HIT")
            .field("http_status", 200u16)
            .build();

        let json: Value = serde_json::from_str(&record.to_json()).unwrap();
        assert_eq!(json["severity"], "info");
        assert_eq!(json["event"], "fetch");
        assert_eq!(json["version"], "v2");
        assert_eq!(json["request_id"], "req-1");
        assert_eq!(json["status"], "HIT");
        assert_eq!(json["http_status"], 200);
    }

    #[test]
    fn test_notification_click_event_name() {
        let record = log(WorkerEvent::NotificationClick).warn("no window").build();
        assert_eq!(record.event.to_string(), "notificationclick");
        assert!(record.to_json().contains(r#""event":"notificationclick""#));
    }

    #[test]
    fn test_repeated_field_keeps_last_value() {
        let record = log(WorkerEvent::Install)
            .debug("retry")
            .field("assets", 3)
            .field("assets", 5)
            .build();
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields["assets"], 5);
    }
}
