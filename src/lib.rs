pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod schema;
pub mod state;
pub mod supabase;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API (every route behind the authentication guard)
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, insurance, profile, settings};

    Router::new()
        .route("/me", get(auth::whoami))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route(
            "/insurances",
            get(insurance::list_insurances).post(insurance::create_insurance),
        )
        .route("/insurances/summary", get(insurance::insurance_summary))
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Coverly API (Rust)",
        "version": version,
        "description": "Insurance wallet backend fronting Supabase auth and tables",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "signup": "POST /signup (public)",
            "login": "POST /login (public)",
            "me": "GET /me (protected)",
            "profile": "GET|PUT /profile (protected)",
            "insurances": "GET|POST /insurances, GET /insurances/summary (protected)",
            "settings": "GET|PUT /settings (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.supabase.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "identity_provider": "ok",
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "identity_provider_error": e.to_string(),
            })),
        ),
    }
}
