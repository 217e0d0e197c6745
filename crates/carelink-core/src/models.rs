//! 核心数据模型定义
//!
//! 对外 JSON 字段统一使用 camelCase，与前端及 AI 提示词中的结构保持一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CareError;

/// 用户角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PATIENT" => Ok(Role::Patient),
            "DOCTOR" => Ok(Role::Doctor),
            other => Err(CareError::Validation(format!("Invalid role: {}", other))),
        }
    }
}

/// 用户基本信息（不含密码哈希）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// 患者档案
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
}

/// 医生档案
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
}

/// 用户账户：用户信息及其角色档案
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(flatten)]
    pub user: User,
    pub patient: Option<PatientProfile>,
    pub doctor: Option<DoctorProfile>,
}

/// 患者信息（关联用户姓名与邮箱）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 处方
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}

/// 检验结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: Uuid,
    pub test_name: String,
    pub result: String,
    pub normal_range: Option<String>,
    pub test_date: Option<DateTime<Utc>>,
}

/// 一次就诊记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub prescriptions: Vec<Prescription>,
    pub test_results: Vec<TestResult>,
}

/// 风险分析结果，创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub risk_factors: Vec<String>,
    pub predictions: String,
    pub recommendations: String,
    pub risk_score: i32,
    pub analyzed_at: DateTime<Utc>,
}

/// 待持久化的风险分析
#[derive(Debug, Clone, PartialEq)]
pub struct NewRiskAnalysis {
    pub patient_id: Uuid,
    pub risk_factors: Vec<String>,
    pub predictions: String,
    pub recommendations: String,
    pub risk_score: i32,
}

/// 新处方（随就诊记录一并创建）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}

/// 新检验结果（随就诊记录一并创建）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestResult {
    pub test_name: String,
    pub result: String,
    pub normal_range: Option<String>,
    pub test_date: Option<DateTime<Utc>>,
}

/// 医生视角的患者列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
    pub last_visit: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_visits: Option<i64>,
}

/// 患者详情及完整就诊历史
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub health_records: Vec<HealthRecord>,
}

/// 患者本人查看的健康档案
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthHistory {
    #[serde(flatten)]
    pub patient: Patient,
    pub health_records: Vec<HealthRecord>,
    pub ai_analyses: Vec<RiskAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_wire_names() {
        assert_eq!("PATIENT".parse::<Role>().unwrap(), Role::Patient);
        assert_eq!("DOCTOR".parse::<Role>().unwrap(), Role::Doctor);
        assert!("ADMIN".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"DOCTOR\"");
    }

    #[test]
    fn test_risk_analysis_serializes_camel_case() {
        let analysis = RiskAnalysis {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            risk_factors: vec!["Diabetes management required".into()],
            predictions: "p".into(),
            recommendations: "r".into(),
            risk_score: 5,
            analyzed_at: Utc::now(),
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["riskScore"], 5);
        assert!(value["riskFactors"].is_array());
        assert!(value.get("analyzedAt").is_some());
    }
}
