mod app;
mod auth;
mod cache;
mod chat;
mod config;
mod error;
mod favorites;
mod food_logs;
mod llm;
mod nutrition;
mod planner;
mod profile;
mod progress;
mod recipes;
mod seed;
mod state;
#[cfg(test)]
mod testing;

use crate::app::{build_app, serve};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutrimind=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(
        nutrition = ?app_state.config.nutrition.provider,
        model = %app_state.config.llm.model,
        "state initialized"
    );

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let writer = app_state.writer.clone();
    let llm = app_state.llm.clone();
    serve(build_app(app_state)).await?;

    writer.drain().await;
    let usage = llm.usage();
    tracing::info!(
        input_tokens = usage.input,
        output_tokens = usage.output,
        "shut down"
    );
    Ok(())
}
