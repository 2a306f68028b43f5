//! WebSocket message types: envelope and commands.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply with a numeric code.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message.into() }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the payload
/// of a `command` message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow the events of specific days.
    Subscribe {
        /// `YYYY-MM-DD` days. Use `["*"]` for every day.
        dates: Vec<String>,
    },
    /// Stop following specific days.
    Unsubscribe {
        /// `YYYY-MM-DD` days, or `"*"` to drop the wildcard.
        dates: Vec<String>,
    },
    /// Current queue of a day.
    QueueStatus {
        /// Day to summarise.
        date: NaiveDate,
    },
    /// Classified slot grid of a day.
    Slots {
        /// Day to classify.
        date: NaiveDate,
    },
}

/// Splits a date list into parsed days, a wildcard flag and rejected
/// entries.
#[must_use]
pub fn parse_dates(raw: &[String]) -> (Vec<NaiveDate>, bool, Vec<String>) {
    let mut dates = Vec::new();
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for entry in raw {
        if entry == "*" {
            wildcard = true;
        } else if let Ok(date) = entry.parse::<NaiveDate>() {
            dates.push(date);
        } else {
            rejected.push(entry.clone());
        }
    }
    (dates, wildcard, rejected)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_tagged() {
        let raw = r#"{"command":"subscribe","dates":["2026-10-20","*"]}"#;
        let Ok(WsCommand::Subscribe { dates }) = serde_json::from_str::<WsCommand>(raw) else {
            panic!("subscribe command");
        };
        let (parsed, wildcard, rejected) = parse_dates(&dates);
        assert_eq!(parsed.len(), 1);
        assert!(wildcard);
        assert!(rejected.is_empty());
    }

    #[test]
    fn bad_dates_are_reported() {
        let (parsed, wildcard, rejected) = parse_dates(&["demain".to_string()]);
        assert!(parsed.is_empty());
        assert!(!wildcard);
        assert_eq!(rejected, vec!["demain".to_string()]);
    }

    #[test]
    fn envelope_uses_type_key() {
        let msg = WsMessage::error("42", 404, "unknown command");
        let Ok(json) = serde_json::to_value(&msg) else {
            panic!("serializable");
        };
        assert_eq!(json.get("type"), Some(&serde_json::json!("error")));
        assert_eq!(
            json.pointer("/payload/code"),
            Some(&serde_json::json!(404))
        );
    }
}
