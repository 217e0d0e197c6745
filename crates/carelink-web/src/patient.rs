//! 患者接口

use axum::{extract::State, response::IntoResponse, Extension, Json};
use carelink_core::{CareError, HealthHistory};

use crate::auth::AuthUser;
use crate::handlers::ApiResult;
use crate::state::AppState;

/// 健康档案中附带的最近风险分析条数
const RECENT_ANALYSES: i64 = 5;

/// 本人完整健康档案
pub async fn health_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let patient = state
        .queries
        .find_patient_by_user_id(user.user_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;

    let health_records = state
        .queries
        .health_records_for_patient(patient.id, None)
        .await?;
    let ai_analyses = state
        .queries
        .recent_risk_analyses(patient.id, RECENT_ANALYSES)
        .await?;

    Ok(Json(HealthHistory {
        patient,
        health_records,
        ai_analyses,
    }))
}

/// 最近一次风险分析，没有时返回 null
pub async fn ai_insights(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let latest = match state.queries.find_patient_by_user_id(user.user_id).await? {
        Some(patient) => state.queries.latest_risk_analysis(patient.id).await?,
        None => None,
    };

    Ok(Json(latest))
}
