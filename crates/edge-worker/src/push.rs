//! Inbound push messages.
//!
//! Payloads arrive as raw bytes. A JSON object with optional string fields
//! `title`, `body` and `url` is used as-is; anything else is shown as plain
//! text under the default title.

use edge_core::PushConfig;
use serde::{Deserialize, Serialize};

use crate::notification::{Notification, NotificationData};

/// A push message as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushMessage {
    data: Option<Vec<u8>>,
}

impl PushMessage {
    /// Message carrying a payload.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }

    /// Message without a payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw payload bytes.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Validate the payload.
    pub fn payload(&self) -> PushPayload {
        PushPayload::parse(self.data())
    }
}

/// Optional fields of a structured payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A push payload after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushPayload {
    /// JSON object with optional fields.
    Structured(PushFields),
    /// Not a JSON object of strings; shown verbatim.
    PlainText(String),
    /// No payload at all.
    Empty,
}

impl PushPayload {
    /// Classify raw payload bytes.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::Empty;
        };

        // Arrays would otherwise deserialize positionally into the fields.
        let fields = serde_json::from_slice::<serde_json::Value>(bytes)
            .ok()
            .filter(serde_json::Value::is_object)
            .and_then(|value| serde_json::from_value::<PushFields>(value).ok());

        match fields {
            Some(fields) => Self::Structured(fields),
            None => {
                tracing::debug!(len = bytes.len(), "push payload is not structured, using plain text");
                Self::PlainText(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Build the notification, filling absent fields from `config`.
    pub fn to_notification(&self, config: &PushConfig) -> Notification {
        let (title, body, url) = match self {
            Self::Structured(fields) => (
                fields.title.clone(),
                fields.body.clone(),
                fields.url.clone(),
            ),
            Self::PlainText(text) => (None, Some(text.clone()), None),
            Self::Empty => (None, None, None),
        };

        Notification {
            title: title.unwrap_or_else(|| config.default_title.clone()),
            body: body.unwrap_or_default(),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                url: url.unwrap_or_else(|| config.default_url.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(payload: &[u8]) -> Notification {
        PushMessage::new(payload)
            .payload()
            .to_notification(&PushConfig::default())
    }

    #[test]
    fn test_plain_text_uses_default_title() {
        let n = notification(b"hello");
        assert_eq!(n.title, "New notification");
        assert_eq!(n.body, "hello");
        assert_eq!(n.data.url, "/");
    }

    #[test]
    fn test_structured_payload() {
        let n = notification(br#"{"title":"Bedtime","body":"Log your sleep","url":"/log"}"#);
        assert_eq!(n.title, "Bedtime");
        assert_eq!(n.body, "Log your sleep");
        assert_eq!(n.data.url, "/log");
        assert_eq!(n.vibrate, vec![100, 50, 100]);
        assert_eq!(n.icon, "/icons/icon-192.png");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let n = notification(br#"{"title":"Only a title"}"#);
        assert_eq!(n.title, "Only a title");
        assert_eq!(n.body, "");
        assert_eq!(n.data.url, "/");
    }

    #[test]
    fn test_wrong_field_type_degrades_to_text() {
        let payload = PushPayload::parse(Some(br#"{"title":42}"#));
        assert_eq!(payload, PushPayload::PlainText(r#"{"title":42}"#.to_string()));
    }

    #[test]
    fn test_json_that_is_not_an_object_degrades_to_text() {
        assert_eq!(
            PushPayload::parse(Some(br#"["t","b","/u"]"#)),
            PushPayload::PlainText(r#"["t","b","/u"]"#.to_string())
        );
    }

    #[test]
    fn test_empty_message() {
        let n = PushMessage::empty()
            .payload()
            .to_notification(&PushConfig::default());
        assert_eq!(n.title, "New notification");
        assert_eq!(n.body, "");
    }
}
