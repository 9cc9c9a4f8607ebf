// Supabase backend client (GoTrue auth + PostgREST tables)
//
// The entire persistence layer of this service lives on the other side of
// these calls: identity is issued and introspected by GoTrue, rows live in
// PostgREST-fronted tables. This module owns the shared HTTP client and the
// request plumbing; it performs no caching and keeps no state of its own.

pub mod auth;
pub mod table;

pub use auth::{AuthApi, AuthError, AuthSession};
pub use table::{StoreError, TableRequest, SERVER_NOW};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Handle to the hosted backend. Constructed once at startup and cloned
/// into request state; cloning is cheap (shared connection pool).
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    service_role_key: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid Supabase URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                anon_key: config.anon_key.clone(),
                service_role_key: config.service_role_key.clone(),
            }),
        })
    }

    /// Identity provider surface (sign-up, sign-in, token introspection).
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Start a table request against the named store table.
    pub fn table(&self, table: &str) -> TableRequest<'_> {
        TableRequest::new(self, table)
    }

    /// Liveness probe against the identity provider.
    pub async fn health(&self) -> Result<(), AuthError> {
        let res = self
            .http()
            .get(self.endpoint("auth/v1/health"))
            .header("apikey", self.anon_key())
            .send()
            .await?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Rejected {
                status: res.status().as_u16(),
                message: format!("health probe returned {}", res.status()),
            })
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.inner.anon_key
    }

    /// Bearer credential for table operations.
    pub(crate) fn table_bearer(&self) -> &str {
        self.inner
            .service_role_key
            .as_deref()
            .unwrap_or(&self.inner.anon_key)
    }
}

/// Pull the human-readable detail out of a backend error body. GoTrue uses
/// `msg` / `error_description`, PostgREST uses `message`.
pub(crate) fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(detail) = value.get(key).and_then(Value::as_str) {
                return detail.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("backend returned {}", status)
    } else {
        trimmed.to_string()
    }
}
