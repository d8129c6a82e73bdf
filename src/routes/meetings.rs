use crate::auth::CalendarSession;
use crate::error::app_error::AppError;
use crate::service::calendar::SharedCalendarProvider;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use serde_json::Value;
use tracing::debug;

/// Up to five upcoming events of the signed-in user's primary calendar, as returned by Google
#[openapi(tag = "Meetings")]
#[get("/upcoming")]
pub async fn list_upcoming(calendar: &State<SharedCalendarProvider>, session: CalendarSession) -> Result<Json<Vec<Value>>, AppError> {
    debug!(
        session_id = %session.session_id,
        token_expired = session.tokens.is_expired(Utc::now()),
        "Listing upcoming meetings"
    );
    let events = calendar.list_upcoming(&session.tokens.access_token).await?;
    Ok(Json(events))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_upcoming]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::test_client;
    use rocket::http::Status;
    use serde_json::{Value, json};

    #[rocket::async_test]
    async fn unauthenticated_without_session_and_provider_untouched() {
        let (client, calendar) = test_client().await;
        let response = client.get("/api/meetings/upcoming").dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body, json!({ "error": "Not authenticated" }));
        assert_eq!(calendar.list_calls(), 0);
    }

    #[rocket::async_test]
    async fn forged_cookie_is_unauthenticated() {
        let (client, calendar) = test_client().await;
        let response = client
            .get("/api/meetings/upcoming")
            .cookie(rocket::http::Cookie::new("meet_ai_session", uuid::Uuid::new_v4().to_string()))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(calendar.list_calls(), 0);
    }

    #[rocket::async_test]
    async fn lists_events_after_callback() {
        let (client, calendar) = test_client().await;
        let callback = client.get("/api/auth/callback?code=good-code").dispatch().await;
        assert_eq!(callback.status(), Status::Ok);

        let response = client.get("/api/meetings/upcoming").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body, Value::Array(calendar.events.clone()));
        assert_eq!(calendar.list_calls(), 1);
    }
}
