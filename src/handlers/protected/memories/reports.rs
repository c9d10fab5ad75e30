// handlers/protected/memories/reports.rs - GET /api/memories/trip/:tripId/{daily,emotions,weather,stats}

use axum::extract::State;

use crate::api::ResourceId;
use crate::database::models::{DailyMemories, EmotionCount, MemoryStats, WeatherCount};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Per date: how many memories, their titles and the emotions noted
pub async fn daily(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<DailyMemories>> {
    let days = state.memories.daily(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(days))
}

pub async fn emotions(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<EmotionCount>> {
    let emotions = state.memories.emotions(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(emotions))
}

pub async fn weather(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<Vec<WeatherCount>> {
    let weather = state.memories.weather(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(weather))
}

pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
    ResourceId(trip_id): ResourceId,
) -> ApiResult<MemoryStats> {
    let stats = state.memories.stats(user.user_id, trip_id).await?;
    Ok(ApiResponse::success(stats))
}
