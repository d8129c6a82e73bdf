use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

const KNOWN_TYPES: [&str; 5] = ["GET_EVENTS", "GET_NOTES", "SAVE_NOTES", "GET_AGENDA", "GET_BRIEF"];

/// Requests the sidebar sends to the background router, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    GetEvents,
    GetNotes { id: String },
    SaveNotes { id: String, notes: String },
    GetAgenda { id: String },
    GetBrief { id: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum ExtensionError {
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("{0}")]
    MissingToken(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Provider(String),
}

impl ExtensionMessage {
    /// Decodes a raw `{ type, ...payload }` object. Unrecognized tags are reported, never dropped.
    pub fn parse(raw: Value) -> Result<Self, ExtensionError> {
        let tag = match raw.get("type").and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => return Err(ExtensionError::InvalidMessage("missing type".to_string())),
        };

        if !KNOWN_TYPES.contains(&tag.as_str()) {
            return Err(ExtensionError::UnknownMessage(tag));
        }

        serde_json::from_value(raw).map_err(|e| ExtensionError::InvalidMessage(format!("{}: {}", tag, e)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtensionMessage::GetEvents => "GET_EVENTS",
            ExtensionMessage::GetNotes { .. } => "GET_NOTES",
            ExtensionMessage::SaveNotes { .. } => "SAVE_NOTES",
            ExtensionMessage::GetAgenda { .. } => "GET_AGENDA",
            ExtensionMessage::GetBrief { .. } => "GET_BRIEF",
        }
    }
}

/// The `{ error }` object handed back to the sidebar in place of a result.
pub fn error_response(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}
