use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::schema::WritePayload;
use crate::state::AppState;
use crate::supabase::StoreError;

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub theme_mode: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub biometric_login: Option<bool>,
    pub language: Option<String>,
}

/// GET /settings - The caller's settings row, or the app defaults when no
/// row exists yet (or the store is unreachable).
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Value> {
    match state
        .supabase
        .table("user_settings")
        .eq("user_id", user.id)
        .select_single()
        .await
    {
        Ok(row) => Json(row),
        Err(err) => {
            if !matches!(err, StoreError::NotFound) {
                tracing::warn!("settings read failed, serving defaults: {err}");
            }
            Json(json!({
                "theme_mode": "system",
                "notifications_enabled": true,
            }))
        }
    }
}

/// PUT /settings - Partial upsert keyed by the caller's id; fields the
/// caller did not provide are left untouched.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<Value>, ApiError> {
    let row = WritePayload::new()
        .owner("user_id", user.id)
        .set_opt("theme_mode", payload.theme_mode)
        .set_opt("notifications_enabled", payload.notifications_enabled)
        .set_opt("biometric_login", payload.biometric_login)
        .set_opt("language", payload.language)
        .stamp("updated_at")
        .into_value();

    let rows = state
        .supabase
        .table("user_settings")
        .upsert(row, "user_id")
        .await
        .map_err(|err| {
            tracing::warn!("settings upsert rejected: {err}");
            ApiError::from(err)
        })?;

    Ok(Json(Value::Array(rows)))
}
