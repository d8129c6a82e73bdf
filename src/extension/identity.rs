use crate::config::ExtensionConfig;
use crate::extension::message::ExtensionError;

/// Source of calendar access tokens on the extension side.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `interactive` allows the provider to ask the user for consent.
    async fn auth_token(&self, interactive: bool) -> Result<String, ExtensionError>;
}

/// Hands out the token configured under `extension.identity_token`.
pub struct ConfiguredIdentity {
    token: Option<String>,
}

impl ConfiguredIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: if token.trim().is_empty() { None } else { Some(token) },
        }
    }

    pub fn from_config(config: &ExtensionConfig) -> Self {
        Self::new(config.identity_token.clone())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ConfiguredIdentity {
    async fn auth_token(&self, _interactive: bool) -> Result<String, ExtensionError> {
        self.token.clone().ok_or_else(|| ExtensionError::MissingToken("No token".to_string()))
    }
}
