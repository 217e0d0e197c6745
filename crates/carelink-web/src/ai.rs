//! AI 接口

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::handlers::{ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// 健康助手对话
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = request.message.unwrap_or_default();
    let response = state.chat.reply(user.user_id, &message).await?;

    Ok(Json(json!({ "response": response })))
}

/// 生成并保存健康风险预测
pub async fn predict(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let analysis = state.prediction.predict_for_user(user.user_id).await?;
    Ok(Json(analysis))
}
