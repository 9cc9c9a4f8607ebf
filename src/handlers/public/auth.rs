use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /signup - Register a new account with the identity provider
///
/// The provider-native response body is passed through verbatim. Provider
/// rejections (duplicate email, weak password) come back as 400 with the
/// provider's own detail text.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim();
    tracing::info!("signing up user '{email}'");

    let response = state.supabase.auth().sign_up(email, &payload.password).await?;
    Ok(Json(response))
}

/// POST /login - Credential sign-in
///
/// Expected Output (Success):
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiI...",
///   "refresh_token": "v1.MRjzK...",
///   "user": { "id": "user_uuid", "email": "a@b.com", "user_metadata": {} }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim();

    let session = state
        .supabase
        .auth()
        .sign_in_with_password(email, &payload.password)
        .await?;

    Ok(Json(json!({
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "user": {
            "id": session.user.get("id").cloned().unwrap_or(Value::Null),
            "email": session.user.get("email").cloned().unwrap_or(Value::Null),
            "user_metadata": session.user.get("user_metadata").cloned().unwrap_or(Value::Null),
        },
    })))
}
