use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
pub struct AuthUrlResponse {
    pub url: String,
}

pub const AUTH_SUCCESS_MESSAGE: &str = "✅ Authentication successful! Close this tab and go back to Meet.";
pub const AUTH_FAILURE_MESSAGE: &str = "Authentication failed";
