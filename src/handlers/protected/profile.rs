use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::schema::{DateRule, WritePayload};
use crate::state::AppState;
use crate::supabase::StoreError;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub avatar_url: Option<String>,
}

/// GET /profile - The caller's profile row.
///
/// A caller with no backing row yet (or an unreachable store) gets a
/// minimal synthesized profile instead of an error.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Value> {
    match state
        .supabase
        .table("profiles")
        .eq("id", user.id)
        .select_single()
        .await
    {
        Ok(row) => Json(row),
        Err(err) => {
            if !matches!(err, StoreError::NotFound) {
                tracing::warn!("profile read failed, serving default: {err}");
            }
            Json(json!({
                "id": user.id,
                "email": user.email,
                "full_name": "New User",
            }))
        }
    }
}

/// PUT /profile - Partial upsert keyed by the caller's id.
///
/// Only fields the caller provided are sent; an empty date_of_birth is
/// treated as not provided rather than stored literally.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
    let row = WritePayload::new()
        .owner("id", user.id)
        .set_opt("full_name", payload.full_name)
        .set_opt("phone_number", payload.phone_number)
        .set_opt("address", payload.address)
        .set_date_opt("date_of_birth", payload.date_of_birth, DateRule::OmitEmpty)
        .set_opt("avatar_url", payload.avatar_url)
        .stamp("updated_at")
        .into_value();

    let rows = state
        .supabase
        .table("profiles")
        .upsert(row, "id")
        .await
        .map_err(|err| {
            tracing::warn!("profile upsert rejected: {err}");
            ApiError::from(err)
        })?;

    Ok(Json(Value::Array(rows)))
}
