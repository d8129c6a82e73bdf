//! Google Calendar OAuth and event listing over plain REST.

use crate::config::GoogleConfig;
use crate::error::app_error::AppError;
use crate::models::session::SessionTokens;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

const SERVICE: &str = "calendar";

#[async_trait::async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Consent URL requesting offline access and the read-only calendar scope.
    fn authorization_url(&self) -> Result<String, AppError>;

    async fn exchange_code(&self, code: &str) -> Result<SessionTokens, AppError>;

    /// Upcoming single events of the configured calendar, ordered by start time, exactly as the provider returned them.
    async fn list_upcoming(&self, access_token: &str) -> Result<Vec<Value>, AppError>;
}

pub type SharedCalendarProvider = Arc<dyn CalendarProvider>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

pub struct GoogleCalendar {
    client: Client,
    config: GoogleConfig,
}

impl GoogleCalendar {
    pub fn new(config: GoogleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to create calendar HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.calendar_id)
        )
    }

    /// Provider error message from a failed response body, falling back to the raw body.
    fn error_message(status: u16, body: &str) -> String {
        match serde_json::from_str::<GoogleErrorBody>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => format!("Google Calendar error {}: {}", status, body),
        }
    }
}

#[async_trait::async_trait]
impl CalendarProvider for GoogleCalendar {
    fn authorization_url(&self) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("access_type", "offline"),
                ("scope", self.config.scope.as_str()),
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| AppError::InvalidConfig(format!("Invalid Google auth URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionTokens, AppError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "OAuth code exchange rejected");
            return Err(AppError::upstream_status(SERVICE, "Google OAuth", status.as_u16(), &body));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse token response: {}", e)))?;

        Ok(SessionTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_in.filter(|secs| *secs > 0).map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }

    async fn list_upcoming(&self, access_token: &str) -> Result<Vec<Value>, AppError> {
        let time_min = time_min(Utc::now());
        let max_results = self.config.max_results.to_string();
        debug!(calendar_id = %self.config.calendar_id, time_min = %time_min, "Listing upcoming events");

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| AppError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Calendar event listing failed");
            return Err(AppError::upstream(SERVICE, Self::error_message(status.as_u16(), &body)));
        }

        let events: EventList = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse event list: {}", e)))?;

        Ok(events.items)
    }
}

fn time_min(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn calendar_for(server: &MockServer) -> GoogleCalendar {
        GoogleCalendar::new(GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            token_url: format!("{}/token", server.uri()),
            api_base_url: server.uri(),
            ..GoogleConfig::default()
        })
        .expect("calendar client")
    }

    #[test]
    fn authorization_url_requests_offline_readonly_access() {
        let calendar = GoogleCalendar::new(GoogleConfig {
            client_id: "abc.apps.googleusercontent.com".to_string(),
            ..GoogleConfig::default()
        })
        .unwrap();

        let url = Url::parse(&calendar.authorization_url().unwrap()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert!(params.contains(&("access_type".to_string(), "offline".to_string())));
        assert!(params.contains(&("scope".to_string(), "https://www.googleapis.com/auth/calendar.readonly".to_string())));
        assert!(params.contains(&("client_id".to_string(), "abc.apps.googleusercontent.com".to_string())));
        assert!(params.contains(&("redirect_uri".to_string(), "http://localhost:3000/api/auth/callback".to_string())));
    }

    #[test]
    fn time_min_is_an_iso_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_eq!(time_min(now), "2026-10-18T09:30:00.000Z");
    }

    #[tokio::test]
    async fn exchanges_code_for_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.access",
                "refresh_token": "1//refresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = calendar_for(&server).exchange_code("auth-code").await.expect("tokens");
        assert_eq!(tokens.access_token, "ya29.access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//refresh"));
        assert!(tokens.expires_at.is_some_and(|at| at > Utc::now()));
    }

    #[tokio::test]
    async fn rejected_code_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
            .mount(&server)
            .await;

        let err = calendar_for(&server).exchange_code("stale").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { service: "calendar", .. }));
    }

    #[tokio::test]
    async fn lists_upcoming_events_unmodified() {
        let server = MockServer::start().await;
        let items = json!([
            { "id": "evt1", "summary": "Standup", "start": { "dateTime": "2026-10-19T09:00:00Z" }, "etag": "\"1\"" },
            { "id": "evt2", "start": { "date": "2026-10-20" } }
        ]);
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer ya29.access"))
            .and(query_param("maxResults", "5"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#events", "items": items })))
            .expect(1)
            .mount(&server)
            .await;

        let events = calendar_for(&server).list_upcoming("ya29.access").await.expect("events");
        assert_eq!(Value::Array(events), items);
    }

    #[tokio::test]
    async fn missing_items_is_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#events" })))
            .mount(&server)
            .await;

        assert!(calendar_for(&server).list_upcoming("t").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": 401, "message": "Request had invalid authentication credentials." }
            })))
            .mount(&server)
            .await;

        let err = calendar_for(&server).list_upcoming("expired").await.unwrap_err();
        assert_eq!(err.to_string(), "Request had invalid authentication credentials.");
    }
}
