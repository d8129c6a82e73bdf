use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct NotesPayload {
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct SaveNotesResponse {
    pub success: bool,
}

impl SaveNotesResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
