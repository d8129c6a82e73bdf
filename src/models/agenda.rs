use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Number of agenda items the prompt asks the model for.
pub const AGENDA_ITEM_COUNT: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct AgendaResponse {
    pub items: Vec<String>,
}

/// How the agenda items were recovered from free-form model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaSource {
    /// Lines starting with `- `.
    Bullets,
    /// No bullet lines; the first non-empty lines were used instead.
    PlainLines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaOutcome {
    /// Exactly [`AGENDA_ITEM_COUNT`] items were recovered.
    Complete { items: Vec<String>, source: AgendaSource },
    /// Fewer items than requested; the model did not follow the format.
    Shortfall { items: Vec<String>, source: AgendaSource },
}

impl AgendaOutcome {
    pub fn new(items: Vec<String>, source: AgendaSource) -> Self {
        if items.len() == AGENDA_ITEM_COUNT {
            Self::Complete { items, source }
        } else {
            Self::Shortfall { items, source }
        }
    }

    pub fn items(&self) -> &[String] {
        match self {
            Self::Complete { items, .. } | Self::Shortfall { items, .. } => items,
        }
    }

    pub fn source(&self) -> AgendaSource {
        match self {
            Self::Complete { source, .. } | Self::Shortfall { source, .. } => *source,
        }
    }

    pub fn is_shortfall(&self) -> bool {
        matches!(self, Self::Shortfall { .. })
    }

    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Complete { items, .. } | Self::Shortfall { items, .. } => items,
        }
    }
}

impl From<AgendaOutcome> for AgendaResponse {
    fn from(outcome: AgendaOutcome) -> Self {
        Self { items: outcome.into_items() }
    }
}
