use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved by the provider for the current request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    /// Full provider user object, returned verbatim by GET /me.
    pub raw: Value,
}

impl CurrentUser {
    fn from_provider(raw: Value) -> Result<Self, ApiError> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

        let email = raw
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self { id, email, raw })
    }
}

/// Bearer-token authentication middleware guarding every protected route.
///
/// Extracts the token from the Authorization header, asks the identity
/// provider to introspect it (once per request, no caching), and injects
/// the resolved [`CurrentUser`] into the request for handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let user = state.supabase.auth().get_user(&token).await.map_err(|err| {
        tracing::debug!("token introspection failed: {err}");
        ApiError::unauthorized("Invalid token")
    })?;

    let current = CurrentUser::from_provider(user)?;
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header. The `Bearer `
/// prefix is tolerated but not required.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("Invalid token"));
    }

    Ok(token.to_string())
}
