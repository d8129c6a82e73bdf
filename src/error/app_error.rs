use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No calendar tokens in the caller's session.
    #[error("Not authenticated")]
    Unauthenticated,
    /// Non-success status or transport failure from the calendar provider or the completion endpoint.
    #[error("{message}")]
    Upstream { service: &'static str, message: String },
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    pub fn upstream_status(service: &'static str, label: &str, status: u16, body: &str) -> Self {
        Self::upstream(service, format!("{} error {}: {}", label, status, body))
    }

    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        Self::upstream(service, format!("{} request failed: {}", service, source))
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Unauthenticated => Status::Unauthorized,
            AppError::Upstream { .. } => Status::InternalServerError,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::InvalidConfig(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let service = match &self {
            AppError::Upstream { service, .. } => *service,
            _ => "backend",
        };

        error!(
            error = ?self,
            request_id = %request_id,
            service = %service,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&self);
        let body = serde_json::json!({ "error": self.to_string() }).to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "Unauthorized - no calendar tokens in session".to_string(),
                ..Default::default()
            }),
        );
        responses.responses.insert(
            "500".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "Upstream provider or completion endpoint failure".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
