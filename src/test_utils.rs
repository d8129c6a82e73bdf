use crate::config::Config;
use crate::error::app_error::AppError;
use crate::models::session::SessionTokens;
use crate::service::calendar::CalendarProvider;
use crate::service::completion::{CompletionClient, CompletionRequest};
use crate::{Integrations, build_rocket_with};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Completion client returning a canned reply and recording every request.
pub struct MockCompletion {
    reply: Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(|message| AppError::upstream("completion", message))
    }
}

/// Calendar provider accepting one authorization code and serving a fixed event list.
pub struct MockCalendar {
    pub valid_code: String,
    pub access_token: String,
    pub events: Vec<Value>,
    list_calls: AtomicUsize,
}

impl MockCalendar {
    pub fn new(events: Vec<Value>) -> Self {
        Self {
            valid_code: "good-code".to_string(),
            access_token: "ya29.mock".to_string(),
            events,
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CalendarProvider for MockCalendar {
    fn authorization_url(&self) -> Result<String, AppError> {
        Ok("https://accounts.google.com/o/oauth2/v2/auth?access_type=offline&client_id=mock".to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionTokens, AppError> {
        if code != self.valid_code {
            return Err(AppError::upstream("calendar", "invalid_grant"));
        }
        Ok(SessionTokens {
            access_token: self.access_token.clone(),
            refresh_token: Some("1//mock-refresh".to_string()),
            expires_at: None,
        })
    }

    async fn list_upcoming(&self, access_token: &str) -> Result<Vec<Value>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if access_token != self.access_token {
            return Err(AppError::upstream("calendar", "Invalid Credentials"));
        }
        Ok(self.events.clone())
    }
}

pub const DEFAULT_AGENDA_REPLY: &str = "- Review action items\n- Walk through metrics\n- Discuss blockers\n- Plan next sprint\n- Open questions";

pub fn sample_events() -> Vec<Value> {
    vec![
        json!({
            "id": "evt123",
            "summary": "Quarterly planning",
            "start": { "dateTime": "2026-10-19T09:00:00Z" }
        }),
        json!({
            "id": "evt456",
            "start": { "date": "2026-10-20" }
        }),
    ]
}

pub async fn test_client() -> (Client, Arc<MockCalendar>) {
    test_client_with(MockCompletion::replying(DEFAULT_AGENDA_REPLY)).await
}

pub async fn test_client_with(completion: MockCompletion) -> (Client, Arc<MockCalendar>) {
    let calendar = Arc::new(MockCalendar::new(sample_events()));
    let integrations = Integrations {
        calendar: calendar.clone(),
        completion: Arc::new(completion),
    };

    let client = Client::tracked(build_rocket_with(Config::default(), integrations))
        .await
        .expect("valid rocket instance");

    (client, calendar)
}
