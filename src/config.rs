use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_PATH: &str = "/api";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub google: GoogleConfig,
    pub completion: CompletionConfig,
    pub extension: ExtensionConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_path: String,
    pub enable_swagger: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Browsers reject `SameSite=None` cookies without `Secure` unless served from localhost.
    pub cookie_secure: bool,
}

/// OAuth client and Calendar API settings for the Google provider.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub calendar_id: String,
    pub scope: String,
    pub max_results: u32,
}

/// Azure OpenAI chat-completions deployment.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtensionConfig {
    pub backend_url: String,
    /// Token handed out by the identity capability; empty means no token is available.
    pub identity_token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AudioConfig {
    pub socket_url: String,
    pub frame_samples: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_API_BASE_PATH.to_string(),
            enable_swagger: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "meet_ai_session".to_string(),
            cookie_secure: false,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            scope: "https://www.googleapis.com/auth/calendar.readonly".to_string(),
            max_results: 5,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_key: String::new(),
            api_version: "2023-05-15".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            identity_token: String::new(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            socket_url: "ws://localhost:3000/audio".to_string(),
            frame_samples: 4096,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. MeetAi.toml (base configuration file)
    /// 2. Environment variables prefixed with MEETAI_, nested with `__` (e.g. MEETAI_GOOGLE__CLIENT_ID)
    /// 3. Plain deployment variables (GOOGLE_CLIENT_ID, AZURE_OPENAI_API_KEY, PORT, ...)
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        let defaults = toml::to_string(&Config::default()).unwrap_or_default();

        Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("MeetAi.toml"))
            .merge(Env::prefixed("MEETAI_").split("__"))
            .merge(Env::raw().only(&COMPAT_ENV.map(|(name, _)| name)).map(|name| compat_key(name.as_str()).into()))
    }
}

const COMPAT_ENV: [(&str, &str); 8] = [
    ("GOOGLE_CLIENT_ID", "google.client_id"),
    ("GOOGLE_CLIENT_SECRET", "google.client_secret"),
    ("OAUTH_REDIRECT_URI", "google.redirect_uri"),
    ("AZURE_OPENAI_ENDPOINT", "completion.endpoint"),
    ("AZURE_OPENAI_DEPLOYMENT", "completion.deployment"),
    ("AZURE_OPENAI_API_KEY", "completion.api_key"),
    ("AZURE_OPENAI_API_VERSION", "completion.api_version"),
    ("PORT", "server.port"),
];

fn compat_key(name: &str) -> &'static str {
    COMPAT_ENV
        .iter()
        .find(|(env_name, _)| env_name.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
        .unwrap_or("unused")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_local_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.google.max_results, 5);
        assert_eq!(config.completion.api_version, "2023-05-15");
        assert_eq!(config.audio.frame_samples, 4096);
        assert_eq!(config.api.base_path, "/api");
    }

    #[test]
    fn compat_env_vars_are_mapped() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_CLIENT_ID", "client-123");
            jail.set_env("AZURE_OPENAI_DEPLOYMENT", "gpt-35-turbo");
            jail.set_env("PORT", "4000");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.google.client_id, "client-123");
            assert_eq!(config.completion.deployment, "gpt-35-turbo");
            assert_eq!(config.server.port, 4000);
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_vars_override_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "MeetAi.toml",
                r#"
                [completion]
                endpoint = "https://from-file.openai.azure.com"
                api_key = "file-key"
                "#,
            )?;
            jail.set_env("MEETAI_COMPLETION__API_KEY", "env-key");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.completion.endpoint, "https://from-file.openai.azure.com");
            assert_eq!(config.completion.api_key, "env-key");
            Ok(())
        });
    }
}
