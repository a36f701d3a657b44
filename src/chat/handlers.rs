use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::context::{build_context, system_prompt, MEAL_HISTORY_DAYS, WEIGHT_HISTORY_DAYS};
use crate::auth::services::AuthUser;
use crate::error::{ok, ApiResponse, AppError};
use crate::food_logs::FoodLog;
use crate::llm::ChatMessage;
use crate::profile::Profile;
use crate::progress::UserProgress;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

fn parse_messages(body: &Value) -> Result<Vec<ChatMessage>, AppError> {
    let invalid = || AppError::BadRequest("Invalid messages format".into());
    let messages = body.get("messages").filter(|m| m.is_array()).ok_or_else(invalid)?;
    serde_json::from_value(messages.clone()).map_err(|e| {
        warn!(error = %e, "rejecting chat messages");
        invalid()
    })
}

async fn load_context(state: &AppState, user_id: Uuid) -> anyhow::Result<String> {
    let today = OffsetDateTime::now_utc().date();
    let profile = Profile::find(&state.db, user_id).await?;
    let progress = UserProgress::list(
        &state.db,
        user_id,
        Some(today - Duration::days(WEIGHT_HISTORY_DAYS)),
        None,
    )
    .await?;
    let logs =
        FoodLog::list_between(&state.db, user_id, today - Duration::days(MEAL_HISTORY_DAYS), today)
            .await?;
    Ok(build_context(today, profile.as_ref(), &progress, &logs))
}

#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let messages = parse_messages(&body)?;
    let context = load_context(&state, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to process chat request", e))?;

    let reply = state
        .llm
        .chat(messages, Some(&system_prompt(&context)))
        .await
        .map_err(|e| AppError::internal("Failed to process chat request", e))?;

    info!(user_id = %user_id, reply_len = reply.len(), "chat reply generated");
    Ok(ok(ChatReply { reply }))
}
