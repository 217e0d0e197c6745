//! 医生接口

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use carelink_core::{
    utils::non_blank, CareError, NewPrescription, NewTestResult, PageRequest, PatientDetail,
};
use carelink_database::{NewHealthRecord, PatientSort, SortOrder};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::handlers::{ApiJson, ApiResult};
use crate::state::AppState;

const PATIENTS_PAGE_SIZE: i64 = 20;
const SEARCH_PAGE_SIZE: i64 = 10;

/// 找不到患者时提示先搜索
const PATIENT_LOOKUP_HINT: &str = "Use /api/doctor/search-patients to find the patient first";

/// 分页查询参数，保持字符串形式以便容错解析
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHealthRecordRequest {
    pub patient_id: Option<String>,
    pub diagnosis: Option<String>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub prescriptions: Option<Vec<NewPrescription>>,
    pub test_results: Option<Vec<NewTestResult>>,
}

/// 医生接诊过的患者
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = PageRequest::from_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        PATIENTS_PAGE_SIZE,
    );

    let doctor = state
        .queries
        .find_doctor_by_user_id(user.user_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    let (patients, total) = state.queries.patients_for_doctor(doctor.id, &page).await?;

    Ok(Json(json!({
        "patients": patients,
        "pagination": page.paginate(total)
    })))
}

/// 搜索全部患者
pub async fn search_patients(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let page = PageRequest::from_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        SEARCH_PAGE_SIZE,
    );
    let sort = PatientSort::from_param(params.sort_by.as_deref());
    let order = SortOrder::from_param(params.order.as_deref());
    let query = params.query.unwrap_or_default();

    let (patients, total) = state
        .queries
        .search_patients(&query, sort, order, &page)
        .await?;

    Ok(Json(json!({
        "patients": patients,
        "pagination": page.paginate(total)
    })))
}

/// 患者详情及全部就诊记录
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let patient_id = Uuid::parse_str(patient_id.trim())
        .map_err(|_| CareError::Validation("Invalid patient ID".to_string()))?;

    let patient = state
        .queries
        .find_patient_by_id(patient_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;
    let health_records = state
        .queries
        .health_records_for_patient(patient.id, None)
        .await?;

    Ok(Json(PatientDetail {
        patient,
        health_records,
    }))
}

/// 新建就诊记录
pub async fn create_health_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateHealthRecordRequest>,
) -> ApiResult<impl IntoResponse> {
    let (patient_id, diagnosis) = match (non_blank(request.patient_id), non_blank(request.diagnosis)) {
        (Some(patient_id), Some(diagnosis)) => (patient_id, diagnosis),
        _ => {
            return Err(CareError::Validation(
                "Patient ID and diagnosis are required".to_string(),
            )
            .into())
        }
    };

    let patient_not_found = || CareError::NotFoundWithHint {
        message: "Patient not found".to_string(),
        hint: PATIENT_LOOKUP_HINT.to_string(),
    };

    // 非法ID不可能对应任何患者
    let patient_id = Uuid::parse_str(patient_id.trim()).map_err(|_| patient_not_found())?;
    let patient = state
        .queries
        .find_patient_by_id(patient_id)
        .await?
        .ok_or_else(patient_not_found)?;

    let doctor = state
        .queries
        .find_doctor_by_user_id(user.user_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    let record = state
        .queries
        .create_health_record(&NewHealthRecord {
            patient_id: patient.id,
            doctor_id: doctor.id,
            diagnosis: diagnosis.trim().to_string(),
            symptoms: non_blank(request.symptoms),
            notes: non_blank(request.notes),
            prescriptions: request.prescriptions.unwrap_or_default(),
            test_results: request.test_results.unwrap_or_default(),
        })
        .await?;

    info!(
        "Doctor {} created health record {} for patient {}",
        doctor.id, record.id, patient.id
    );
    Ok(Json(record))
}
