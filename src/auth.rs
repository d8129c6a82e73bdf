use crate::config::{Config, SessionConfig};
use crate::database::session::SharedSessionRepository;
use crate::error::app_error::AppError;
use crate::models::session::SessionTokens;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use uuid::Uuid;

/// Calendar credentials of the caller, resolved from the private session cookie.
#[derive(Debug, Clone)]
pub struct CalendarSession {
    pub session_id: Uuid,
    pub tokens: SessionTokens,
}

pub(crate) fn parse_session_cookie_value(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

pub(crate) fn session_id_from_cookies(cookies: &CookieJar<'_>, session_config: &SessionConfig) -> Option<Uuid> {
    cookies
        .get_private(&session_config.cookie_name)
        .and_then(|cookie| parse_session_cookie_value(cookie.value()))
}

/// Returns the caller's session id, issuing a fresh cookie when there is none yet.
pub(crate) fn ensure_session_cookie(cookies: &CookieJar<'_>, session_config: &SessionConfig) -> Uuid {
    if let Some(id) = session_id_from_cookies(cookies, session_config) {
        return id;
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((session_config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(session_config.cookie_secure)
        .build();
    cookies.add_private(cookie);
    id
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CalendarSession {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let (config, sessions) = match (req.rocket().state::<Config>(), req.rocket().state::<SharedSessionRepository>()) {
            (Some(config), Some(sessions)) => (config, sessions),
            _ => {
                return Outcome::Error((
                    Status::InternalServerError,
                    AppError::InvalidConfig("session store is not managed".to_string()),
                ));
            }
        };

        let Some(session_id) = session_id_from_cookies(req.cookies(), &config.session) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthenticated));
        };

        match sessions.get_session(&session_id).await {
            Ok(Some(session)) => match session.tokens {
                Some(tokens) => Outcome::Success(CalendarSession { session_id, tokens }),
                None => Outcome::Error((Status::Unauthorized, AppError::Unauthenticated)),
            },
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::Unauthenticated)),
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CalendarSession {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Session cookie set by GET /api/auth/callback after Google sign-in.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: "meet_ai_session".to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("sessionCookie".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("sessionCookie".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Not authenticated - sign in with Google first".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
