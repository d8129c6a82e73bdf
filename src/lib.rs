mod auth;
mod config;
mod database;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

pub mod audio;
pub mod extension;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use database::memory_repository::MemoryRepository;
pub use error::app_error::AppError;
pub use models::agenda::{AGENDA_ITEM_COUNT, AgendaOutcome, AgendaSource};
pub use models::meeting::{MeetingEvent, UNTITLED_MEETING};
pub use service::calendar::{CalendarProvider, GoogleCalendar, SharedCalendarProvider};
pub use service::completion::{AzureOpenAiClient, ChatMessage, CompletionClient, CompletionRequest, SharedCompletionClient};
pub use service::parsing::{parse_agenda, parse_brief};

use crate::database::notes::SharedNotesRepository;
use crate::database::session::SharedSessionRepository;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Outbound integrations the backend talks to.
#[derive(Clone)]
pub struct Integrations {
    pub calendar: SharedCalendarProvider,
    pub completion: SharedCompletionClient,
}

impl Integrations {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            calendar: Arc::new(GoogleCalendar::new(config.google.clone())?),
            completion: Arc::new(AzureOpenAiClient::new(config.completion.clone())?),
        })
    }
}

pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=meet_ai::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when several rockets are built in one process.
    let _ = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
}

fn ensure_rocket_secret_key() {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    // The secret key signs the private session cookie; debug builds get an ephemeral one.
    if profile != "debug" && std::env::var("ROCKET_SECRET_KEY").is_err() {
        panic!(
            "ROCKET_SECRET_KEY is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Leave allowed_origins empty to mirror the caller's origin instead."
        );
    }

    // An empty list mirrors the request origin, which is what extension pages need.
    let allowed_origins = if cors_config.allowed_origins.is_empty() || is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Options]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        send_wildcard: false,
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    format!("{}/{}", base_path.trim_end_matches('/'), path.trim_start_matches('/'))
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (auth_routes, auth_openapi) = app_routes::auth::routes();
    let (meetings_routes, meetings_openapi) = app_routes::meetings::routes();
    let (meeting_routes, meeting_openapi) = app_routes::meeting::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/auth",
            routes: auth_routes,
            openapi: auth_openapi,
        },
        RouteSpec {
            path: "/meetings",
            routes: meetings_routes,
            openapi: meetings_openapi,
        },
        RouteSpec {
            path: "/meeting",
            routes: meeting_routes,
            openapi: meeting_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let route_specs = collect_route_specs();

    if !enable_swagger {
        for spec in route_specs {
            rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        }
        return rocket;
    }

    let mut openapi_list = Vec::new();
    for spec in route_specs {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    let openapi_docs = match marge_spec_list(&openapi_list) {
        Ok(docs) => docs,
        Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
    };

    let settings = rocket_okapi::settings::OpenApiSettings::default();
    rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

    let swagger = SwaggerUIConfig {
        url: join_base_path(base_path, "openapi.json"),
        ..Default::default()
    };
    rocket.mount(join_base_path(base_path, "docs"), make_swagger_ui(&swagger))
}

fn stage_integrations(config: Config) -> AdHoc {
    AdHoc::try_on_ignite("Calendar and completion clients", |rocket| async move {
        match Integrations::from_config(&config) {
            Ok(integrations) => {
                tracing::info!(
                    calendar_api = %config.google.api_base_url,
                    completion_deployment = %config.completion.deployment,
                    "Integrations initialized"
                );
                Ok(rocket.manage(integrations.calendar).manage(integrations.completion))
            }
            Err(e) => {
                tracing::error!("Failed to initialize integrations: {}", e);
                Err(rocket)
            }
        }
    })
}

fn assemble(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_rocket_secret_key();

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");
    let base_path = normalize_base_path(&config.api.base_path);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let repository = MemoryRepository::new();
    let notes: SharedNotesRepository = Arc::new(repository.clone());
    let sessions: SharedSessionRepository = Arc::new(repository);
    let enable_swagger = config.api.enable_swagger;

    let rocket = rocket::custom(figment)
        .attach(cors)
        .attach(RequestLogger)
        .manage(notes)
        .manage(sessions)
        .manage(config);

    mount_api_routes(rocket, &base_path, enable_swagger).register(
        base_path.as_str(),
        catchers![
            app_routes::error::bad_request,
            app_routes::error::unauthorized,
            app_routes::error::not_found,
            app_routes::error::unprocessable,
            app_routes::error::internal_error
        ],
    )
}

/// Backend wired to Google Calendar and Azure OpenAI as configured.
pub fn build_rocket(config: Config) -> Rocket<Build> {
    let integrations = stage_integrations(config.clone());
    assemble(config).attach(integrations)
}

/// Backend wired to caller-supplied integrations.
pub fn build_rocket_with(config: Config, integrations: Integrations) -> Rocket<Build> {
    assemble(config).manage(integrations.calendar).manage(integrations.completion)
}
