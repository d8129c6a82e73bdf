use crate::config::{Config, DEFAULT_API_BASE_PATH};
use crate::error::app_error::AppError;
use crate::extension::identity::{ConfiguredIdentity, IdentityProvider};
use crate::extension::message::{ExtensionError, ExtensionMessage, error_response};
use crate::service::calendar::{GoogleCalendar, SharedCalendarProvider};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Anything the sidebar can hand a message to and await a JSON reply from.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, message: ExtensionMessage) -> Value;
}

/// Background dispatcher: backend-bound messages are proxied over HTTP, `GET_EVENTS` goes straight to the calendar provider.
#[derive(Clone)]
pub struct MessageRouter {
    client: Client,
    backend_url: String,
    identity: Arc<dyn IdentityProvider>,
    calendar: SharedCalendarProvider,
}

impl MessageRouter {
    pub fn new(backend_url: &str, identity: Arc<dyn IdentityProvider>, calendar: SharedCalendarProvider) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to create backend HTTP client: {}", e)))?;

        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            identity,
            calendar,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let calendar = Arc::new(GoogleCalendar::new(config.google.clone())?);
        let identity = Arc::new(ConfiguredIdentity::from_config(&config.extension));
        Self::new(&config.extension.backend_url, identity, calendar)
    }

    /// Registers the message and returns at once; the reply arrives on the receiver.
    pub fn dispatch(&self, message: ExtensionMessage) -> oneshot::Receiver<Value> {
        let (tx, rx) = oneshot::channel();
        let router = self.clone();

        tokio::spawn(async move {
            let response = router.handle(message).await;
            // The sender may have gone away; its reply is simply dropped.
            let _ = tx.send(response);
        });

        rx
    }

    /// Like [`dispatch`](Self::dispatch) for an undecoded `{ type, ... }` object.
    pub fn dispatch_raw(&self, raw: Value) -> Result<oneshot::Receiver<Value>, ExtensionError> {
        match ExtensionMessage::parse(raw) {
            Ok(message) => Ok(self.dispatch(message)),
            Err(e) => {
                warn!(error = %e, "Rejected extension message");
                Err(e)
            }
        }
    }

    pub async fn handle(&self, message: ExtensionMessage) -> Value {
        debug!(message_type = message.kind(), "Handling extension message");

        match message {
            ExtensionMessage::GetEvents => self.events().await,
            ExtensionMessage::GetNotes { id } => self.backend_json(self.client.get(self.meeting_url(&id, "notes"))).await,
            ExtensionMessage::SaveNotes { id, notes } => {
                self.backend_json(self.client.post(self.meeting_url(&id, "notes")).json(&json!({ "notes": notes })))
                    .await
            }
            ExtensionMessage::GetAgenda { id } => self.backend_json(self.empty_post(&id, "agenda")).await,
            ExtensionMessage::GetBrief { id } => self.backend_json(self.empty_post(&id, "brief")).await,
        }
    }

    /// Where the sidebar's login prompt points the user.
    pub fn login_url(&self) -> String {
        format!("{}{}/auth/url", self.backend_url, DEFAULT_API_BASE_PATH)
    }

    fn meeting_url(&self, id: &str, action: &str) -> String {
        format!("{}{}/meeting/{}/{}", self.backend_url, DEFAULT_API_BASE_PATH, urlencoding::encode(id), action)
    }

    fn empty_post(&self, id: &str, action: &str) -> RequestBuilder {
        self.client.post(self.meeting_url(id, action)).header(CONTENT_TYPE, "application/json")
    }

    async fn events(&self) -> Value {
        let token = match self.identity.auth_token(true).await {
            Ok(token) => token,
            Err(e) => return error_response(e),
        };

        match self.calendar.list_upcoming(&token).await {
            Ok(events) => Value::Array(events),
            Err(e) => {
                warn!(error = %e, "Direct calendar listing failed");
                error_response(e)
            }
        }
    }

    // Replies are passed through whatever their status; the backend puts `{ error }` in failing bodies.
    async fn backend_json(&self, request: RequestBuilder) -> Value {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Backend request failed");
                return error_response(ExtensionError::Transport(e.to_string()));
            }
        };

        match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => error_response(ExtensionError::Transport(e.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl Messenger for MessageRouter {
    async fn send(&self, message: ExtensionMessage) -> Value {
        self.dispatch(message)
            .await
            .unwrap_or_else(|_| error_response("No response from background"))
    }
}
