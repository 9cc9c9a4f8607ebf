use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::{extract_error_message, SupabaseClient};

/// Identity provider failures. `Rejected` carries the provider's own detail
/// text (duplicate email, bad credentials, expired token); `Http` covers
/// transport problems and unparseable responses.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Session issued by the password grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Value,
}

/// GoTrue operations: registration, password sign-in, token introspection.
pub struct AuthApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// POST /auth/v1/signup - register a new account.
    ///
    /// Returns the provider-native response body untouched; callers pass it
    /// through to their own clients verbatim.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Value, AuthError> {
        let res = self
            .client
            .http()
            .post(self.client.endpoint("auth/v1/signup"))
            .header("apikey", self.client.anon_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    /// POST /auth/v1/token?grant_type=password - credential sign-in.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let res = self
            .client
            .http()
            .post(self.client.endpoint("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.client.anon_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }

    /// GET /auth/v1/user - resolve a bearer token to its user.
    ///
    /// Called once per protected request; the provider re-validates the
    /// token every time (no caching on this side).
    pub async fn get_user(&self, token: &str) -> Result<Value, AuthError> {
        let res = self
            .client
            .http()
            .get(self.client.endpoint("auth/v1/user"))
            .header("apikey", self.client.anon_key())
            .bearer_auth(token)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }
        Ok(res.json().await?)
    }
}

async fn rejection(res: reqwest::Response) -> AuthError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    AuthError::Rejected {
        status: status.as_u16(),
        message: extract_error_message(&body, status),
    }
}
