use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::{error::ApiError, response::ApiResponse},
    assistant::{AssistantStatus, ConsumptionPrediction, QUICK_SUGGESTIONS},
    controller::AppState,
    household::ChatMessage,
};

pub const DEFAULT_PREDICTION_MONTHS: u32 = 12;
pub const DEFAULT_TARGET_REDUCTION: f64 = 20.0;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictionRequest {
    months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptimizationRequest {
    target_reduction: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyRequest {
    data: serde_json::Value,
}

/// Free-text answer from the model
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    content: String,
}

/// GET /api/v1/assistant/status
pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AssistantStatus>>, ApiError> {
    Ok(Json(ApiResponse::success(state.assistant.status())))
}

/// GET /api/v1/assistant/suggestions - Quick prompts for the chat box
pub async fn suggestions() -> Result<Json<ApiResponse<Vec<&'static str>>>, ApiError> {
    Ok(Json(ApiResponse::success(QUICK_SUGGESTIONS.to_vec())))
}

/// POST /api/v1/assistant/chat
///
/// Always answers: provider failures fall back to the offline responder,
/// flagged in `metadata.fallback`.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message cannot be empty"));
    }

    let ctx = state.assistant_context().await?;
    let reply = state.assistant.chat(message, &ctx).await;
    let answer = ChatMessage::assistant(reply.content, reply.fallback);

    let mut household = state.household.write().await;
    household.push_chat(ChatMessage::user(message));
    household.push_chat(answer.clone());

    Ok(Json(ApiResponse::success(answer).with_fallback(reply.fallback)))
}

/// GET /api/v1/assistant/history
pub async fn history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let history: Vec<ChatMessage> = state
        .household
        .read()
        .await
        .chat_history()
        .cloned()
        .collect();
    let total = history.len();
    Ok(Json(ApiResponse::success(history).with_count(total)))
}

/// DELETE /api/v1/assistant/history
pub async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.household.write().await.clear_chat();
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assistant/analysis - Full household analysis
pub async fn analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, ApiError> {
    let ctx = state.assistant_context().await?;
    let content = state
        .assistant
        .comprehensive_analysis(&ctx, request.query.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(AnalysisResponse { content })))
}

/// POST /api/v1/assistant/predict - Month-by-month consumption prediction
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<ApiResponse<ConsumptionPrediction>>, ApiError> {
    let months = request.months.unwrap_or(DEFAULT_PREDICTION_MONTHS);
    if !(1..=24).contains(&months) {
        return Err(ApiError::validation("months must be between 1 and 24"));
    }
    let ctx = state.assistant_context().await?;
    let prediction = state.assistant.predict_consumption(&ctx, months).await?;
    let total = prediction.predictions.len();
    Ok(Json(ApiResponse::success(prediction).with_count(total)))
}

/// POST /api/v1/assistant/optimize - Plan to cut consumption by a target percentage
pub async fn optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizationRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, ApiError> {
    let target = request.target_reduction.unwrap_or(DEFAULT_TARGET_REDUCTION);
    if !(target > 0.0 && target <= 100.0) {
        return Err(ApiError::validation(
            "target_reduction must be a percentage between 0 and 100",
        ));
    }
    let ctx = state.assistant_context().await?;
    let content = state.assistant.optimize(&ctx, target).await?;
    Ok(Json(ApiResponse::success(AnalysisResponse { content })))
}

/// POST /api/v1/assistant/anomalies - Explain unusual readings
pub async fn anomalies(
    State(state): State<AppState>,
    Json(request): Json<AnomalyRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, ApiError> {
    let content = state.assistant.analyze_anomalies(&request.data).await?;
    Ok(Json(ApiResponse::success(AnalysisResponse { content })))
}
