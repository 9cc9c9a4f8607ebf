use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. https://abc123.supabase.co
    pub url: String,
    pub anon_key: String,
    /// Used for table reads/writes when present; falls back to the anon key.
    pub service_role_key: Option<String>,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = parse_environment(env::var("APP_ENV").ok().as_deref());

        // Allow tests or deployments to override port via env
        let port = env::var("COVERLY_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8000);

        let url = env::var("SUPABASE_URL").map_err(|_| ConfigError::MissingVar("SUPABASE_URL"))?;
        let anon_key =
            env::var("SUPABASE_ANON_KEY").map_err(|_| ConfigError::MissingVar("SUPABASE_ANON_KEY"))?;
        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY").ok();

        let http_timeout_secs = env::var("SUPABASE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            environment,
            server: ServerConfig { port },
            supabase: SupabaseConfig {
                url,
                anon_key,
                service_role_key,
                http_timeout_secs,
            },
        })
    }
}

fn parse_environment(value: Option<&str>) -> Environment {
    match value {
        Some("production") | Some("prod") => Environment::Production,
        Some("staging") | Some("stage") => Environment::Staging,
        _ => Environment::Development,
    }
}
