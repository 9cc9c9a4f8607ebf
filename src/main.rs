use anyhow::Context;

use coverly_api_rust::{app, config::AppConfig, state::AppState, supabase::SupabaseClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting Coverly API in {:?} mode", config.environment);

    let supabase = SupabaseClient::new(&config.supabase)?;
    let port = config.server.port;
    let state = AppState::new(config, supabase);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Coverly API listening on http://{bind_addr}");

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
