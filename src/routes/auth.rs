use crate::auth::ensure_session_cookie;
use crate::config::Config;
use crate::database::session::SharedSessionRepository;
use crate::error::app_error::AppError;
use crate::models::auth::{AUTH_FAILURE_MESSAGE, AUTH_SUCCESS_MESSAGE, AuthUrlResponse};
use crate::service::calendar::SharedCalendarProvider;
use rocket::http::{ContentType, CookieJar, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::{Request, State, get};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::openapi;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use tracing::{error, info};

/// Plain-text failure page for the OAuth redirect. Details stay in the server log.
#[derive(Debug)]
pub struct AuthCallbackFailed;

impl<'r> Responder<'r, 'static> for AuthCallbackFailed {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .status(Status::InternalServerError)
            .header(ContentType::Plain)
            .sized_body(AUTH_FAILURE_MESSAGE.len(), Cursor::new(AUTH_FAILURE_MESSAGE))
            .ok()
    }
}

impl OpenApiResponderInner for AuthCallbackFailed {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        responses.responses.insert(
            "500".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "Authentication failed".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

/// Google consent URL for offline, read-only calendar access
#[openapi(tag = "Auth")]
#[get("/url")]
pub async fn get_auth_url(calendar: &State<SharedCalendarProvider>) -> Result<Json<AuthUrlResponse>, AppError> {
    let url = calendar.authorization_url()?;
    Ok(Json(AuthUrlResponse { url }))
}

/// OAuth redirect target: exchanges the code and stores the tokens in the caller's session
#[openapi(tag = "Auth")]
#[get("/callback?<code>")]
pub async fn auth_callback(
    calendar: &State<SharedCalendarProvider>,
    sessions: &State<SharedSessionRepository>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    code: Option<String>,
) -> Result<String, AuthCallbackFailed> {
    let Some(code) = code.filter(|code| !code.is_empty()) else {
        error!("OAuth callback without an authorization code");
        return Err(AuthCallbackFailed);
    };

    let tokens = calendar.exchange_code(&code).await.map_err(|e| {
        error!(error = %e, "OAuth code exchange failed");
        AuthCallbackFailed
    })?;

    let session_id = ensure_session_cookie(cookies, &config.session);
    let session = sessions.store_tokens(&session_id, tokens).await.map_err(|e| {
        error!(error = %e, "Failed to store session tokens");
        AuthCallbackFailed
    })?;

    info!(session_id = %session.id, session_created = %session.created_at, "Calendar authentication completed");
    Ok(AUTH_SUCCESS_MESSAGE.to_string())
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_auth_url, auth_callback]
}
