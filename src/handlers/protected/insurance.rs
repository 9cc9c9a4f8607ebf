use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::schema::{DateRule, WritePayload};
use crate::state::AppState;
use crate::supabase::StoreError;

/// Rows returned by the summary endpoint.
const SUMMARY_LIMIT: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct InsuranceCreate {
    pub provider_name: String,
    pub policy_number: String,
    pub policy_type: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub premium_amount: f64,
    pub coverage_amount: f64,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "Active".to_string()
}

/// GET /insurances - Every insurance record owned by the caller.
pub async fn list_insurances(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Value> {
    read_or_empty(&state, &user, None).await
}

/// GET /insurances/summary - The caller's records capped at three rows.
/// No aggregation happens here; the cap is the whole summary.
pub async fn insurance_summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Value> {
    read_or_empty(&state, &user, Some(SUMMARY_LIMIT)).await
}

async fn read_or_empty(state: &AppState, user: &CurrentUser, limit: Option<u32>) -> Json<Value> {
    let mut request = state.supabase.table("insurances").eq("user_id", user.id);
    if let Some(limit) = limit {
        request = request.limit(limit);
    }

    match request.select().await {
        Ok(rows) => Json(Value::Array(rows)),
        Err(err) => {
            if !matches!(err, StoreError::NotFound) {
                tracing::warn!("insurance read failed, serving empty list: {err}");
            }
            Json(json!([]))
        }
    }
}

/// POST /insurances - Insert a new record tagged with the caller's id.
///
/// Empty start/end dates are stored as SQL null, not empty strings.
pub async fn create_insurance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<InsuranceCreate>,
) -> Result<Json<Value>, ApiError> {
    let row = WritePayload::new()
        .owner("user_id", user.id)
        .set("provider_name", payload.provider_name)
        .set("policy_number", payload.policy_number)
        .set("policy_type", payload.policy_type)
        .set_date_opt("start_date", payload.start_date, DateRule::NullEmpty)
        .set_date_opt("end_date", payload.end_date, DateRule::NullEmpty)
        .set("premium_amount", payload.premium_amount)
        .set("coverage_amount", payload.coverage_amount)
        .set("status", payload.status)
        .stamp("created_at")
        .stamp("updated_at")
        .into_value();

    let rows = state
        .supabase
        .table("insurances")
        .insert(row)
        .await
        .map_err(|err| {
            tracing::warn!("insurance insert rejected: {err}");
            ApiError::from(err)
        })?;

    Ok(Json(Value::Array(rows)))
}
