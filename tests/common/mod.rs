// Shared test harness: serves the real router in-process against a mock
// Supabase backend (GoTrue + PostgREST emulation with in-memory tables).
//
// Not every test binary uses every helper here.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use coverly_api_rust::{
    app,
    config::{AppConfig, Environment, ServerConfig, SupabaseConfig},
    state::AppState,
    supabase::SupabaseClient,
};

/// Token fixtures understood by the mock identity provider.
pub const VALID_TOKEN: &str = "valid-token";
/// Resolves to a user whose table requests the mock store always fails.
pub const STORE_ERROR_TOKEN: &str = "store-error-token";

pub const USER_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const USER_EMAIL: &str = "a@b.com";
pub const STORE_ERROR_USER_ID: &str = "99999999-9999-9999-9999-999999999999";

/// Email the mock provider rejects as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

type Tables = Arc<Mutex<HashMap<String, Vec<Value>>>>;

#[derive(Clone, Default)]
struct MockState {
    tables: Tables,
}

pub struct TestApp {
    pub base_url: String,
    tables: Tables,
}

impl TestApp {
    /// Seed a row directly into the mock store.
    pub fn seed(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Snapshot of a mock table's rows.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

/// Boot the mock backend and the application under test, each on an
/// ephemeral port.
pub async fn spawn_app() -> Result<TestApp> {
    let mock_state = MockState::default();
    let tables = mock_state.tables.clone();

    let mock_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let mock_addr = mock_listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(mock_listener, supabase_mock(mock_state))
            .await
            .expect("mock supabase server");
    });

    let config = AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        supabase: SupabaseConfig {
            url: format!("http://{mock_addr}"),
            anon_key: "test-anon-key".to_string(),
            service_role_key: Some("test-service-key".to_string()),
            http_timeout_secs: 5,
        },
    };
    let supabase = SupabaseClient::new(&config.supabase)?;
    let state = AppState::new(config, supabase);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("app server");
    });

    Ok(TestApp {
        base_url: format!("http://{addr}"),
        tables,
    })
}

fn supabase_mock(state: MockState) -> Router {
    Router::new()
        .route("/auth/v1/health", get(mock_health))
        .route("/auth/v1/signup", post(mock_signup))
        .route("/auth/v1/token", post(mock_token))
        .route("/auth/v1/user", get(mock_get_user))
        .route("/rest/v1/:table", get(mock_table_select).post(mock_table_write))
        .with_state(state)
}

fn mock_user(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "aud": "authenticated",
        "role": "authenticated",
        "user_metadata": { "plan": "basic" },
    })
}

async fn mock_health() -> Json<Value> {
    Json(json!({ "name": "GoTrue", "description": "mock" }))
}

async fn mock_signup(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == TAKEN_EMAIL {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "msg": "User already registered" })),
        )
            .into_response();
    }
    Json(mock_user(USER_ID, email)).into_response()
}

async fn mock_token(
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_description": "unsupported grant type" })),
        )
            .into_response();
    }

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if email == USER_EMAIL && password == "x" {
        Json(json!({
            "access_token": VALID_TOKEN,
            "token_type": "bearer",
            "refresh_token": "refresh-token",
            "user": mock_user(USER_ID, USER_EMAIL),
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error_description": "Invalid login credentials" })),
        )
            .into_response()
    }
}

async fn mock_get_user(headers: HeaderMap) -> Response {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    match token {
        VALID_TOKEN => Json(mock_user(USER_ID, USER_EMAIL)).into_response(),
        STORE_ERROR_TOKEN => Json(mock_user(STORE_ERROR_USER_ID, "outage@example.com")).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "msg": "invalid JWT" })),
        )
            .into_response(),
    }
}

async fn mock_table_select(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(outage) = forced_outage(&params) {
        return outage;
    }

    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = matching_rows(&state, &table, &params)
        .into_iter()
        .take(limit)
        .collect();

    let wants_single = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .map(|a| a.contains("vnd.pgrst.object+json"))
        .unwrap_or(false);

    if wants_single {
        if rows.len() == 1 {
            return Json(rows.into_iter().next().unwrap()).into_response();
        }
        return (
            StatusCode::NOT_ACCEPTABLE,
            Json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned",
            })),
        )
            .into_response();
    }

    Json(Value::Array(rows)).into_response()
}

async fn mock_table_write(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if row_owner_is_broken(&body) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "new row violates row-level security policy" })),
        )
            .into_response();
    }

    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let is_upsert = prefer.contains("resolution=merge-duplicates");

    let mut tables = state.tables.lock().unwrap();
    let rows = tables.entry(table).or_default();

    if is_upsert {
        let key = params
            .get("on_conflict")
            .cloned()
            .unwrap_or_else(|| "id".to_string());
        let position = rows
            .iter()
            .position(|r| body.get(&key).is_some() && r.get(&key) == body.get(&key));

        if let Some(position) = position {
            if let (Some(target), Some(source)) = (rows[position].as_object_mut(), body.as_object())
            {
                for (column, value) in source {
                    target.insert(column.clone(), value.clone());
                }
            }
            let stored = rows[position].clone();
            return Json(Value::Array(vec![stored])).into_response();
        }

        rows.push(body.clone());
        return (StatusCode::CREATED, Json(Value::Array(vec![body]))).into_response();
    }

    // Plain insert: assign an id when the row has none.
    let mut row = body;
    if row.get("id").is_none() {
        if let Some(object) = row.as_object_mut() {
            object.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
    }
    rows.push(row.clone());
    (StatusCode::CREATED, Json(Value::Array(vec![row]))).into_response()
}

/// Any eq-filter on the designated outage user simulates a store failure.
fn forced_outage(params: &HashMap<String, String>) -> Option<Response> {
    let broken = params
        .values()
        .any(|v| v == &format!("eq.{STORE_ERROR_USER_ID}"));
    broken.then(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "simulated store outage" })),
        )
            .into_response()
    })
}

fn row_owner_is_broken(row: &Value) -> bool {
    ["id", "user_id"]
        .iter()
        .any(|column| row.get(*column).and_then(Value::as_str) == Some(STORE_ERROR_USER_ID))
}

fn matching_rows(state: &MockState, table: &str, params: &HashMap<String, String>) -> Vec<Value> {
    let tables = state.tables.lock().unwrap();
    let rows = tables.get(table).cloned().unwrap_or_default();

    rows.into_iter()
        .filter(|row| {
            params.iter().all(|(column, filter)| match filter.strip_prefix("eq.") {
                Some(want) => row
                    .get(column)
                    .map(|value| json_matches(value, want))
                    .unwrap_or(false),
                // select=, limit=, on_conflict= are not filters
                None => true,
            })
        })
        .collect()
}

fn json_matches(value: &Value, want: &str) -> bool {
    match value {
        Value::String(s) => s == want,
        other => other.to_string() == want,
    }
}
