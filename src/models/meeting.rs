use rocket::serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title shown for events without a summary.
pub const UNTITLED_MEETING: &str = "(No title)";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// The parts of a provider event the sidebar reads. The backend itself passes events through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MeetingEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
}

impl MeetingEvent {
    /// Reads an event out of a raw provider object; `None` when it carries no id.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn label(&self) -> &str {
        match self.summary.as_deref() {
            Some(summary) if !summary.is_empty() => summary,
            _ => UNTITLED_MEETING,
        }
    }

    pub fn starts_at(&self) -> Option<&str> {
        self.start.as_ref().and_then(|start| start.date_time.as_deref().or(start.date.as_deref()))
    }
}
