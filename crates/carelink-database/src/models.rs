//! 数据库模型

use carelink_core::models::*;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// 数据库表模型 - 使用FromRow trait用于SQL查询

/// 数据库用户表
#[derive(Debug, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String, // 存储为字符串，转换为Role枚举
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(db_user: DbUser) -> Self {
        User {
            id: db_user.id,
            email: db_user.email,
            name: db_user.name,
            role: match db_user.role.as_str() {
                "DOCTOR" => Role::Doctor,
                _ => Role::Patient, // 表约束只允许两种角色
            },
            created_at: db_user.created_at,
        }
    }
}

/// 数据库患者档案表
#[derive(Debug, FromRow)]
pub struct DbPatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
}

impl From<DbPatientProfile> for PatientProfile {
    fn from(db: DbPatientProfile) -> Self {
        PatientProfile {
            id: db.id,
            user_id: db.user_id,
            date_of_birth: db.date_of_birth,
            blood_group: db.blood_group,
            phone: db.phone,
            allergies: db.allergies,
        }
    }
}

/// 数据库医生档案表
#[derive(Debug, FromRow)]
pub struct DbDoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
}

impl From<DbDoctorProfile> for DoctorProfile {
    fn from(db: DbDoctorProfile) -> Self {
        DoctorProfile {
            id: db.id,
            user_id: db.user_id,
            specialization: db.specialization,
            license_number: db.license_number,
            phone: db.phone,
        }
    }
}

/// 患者表关联用户表的查询结果
#[derive(Debug, FromRow)]
pub struct DbPatient {
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

impl From<DbPatient> for Patient {
    fn from(db: DbPatient) -> Self {
        Patient {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            email: db.email,
            date_of_birth: db.date_of_birth,
            blood_group: db.blood_group,
            phone: db.phone,
            allergies: db.allergies,
            created_at: db.created_at,
        }
    }
}

/// 患者列表查询结果
#[derive(Debug, FromRow)]
pub struct DbPatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
    pub last_visit: Option<DateTime<Utc>>,
    pub total_visits: Option<i64>,
}

impl From<DbPatientSummary> for PatientSummary {
    fn from(db: DbPatientSummary) -> Self {
        PatientSummary {
            id: db.id,
            name: db.name,
            email: db.email,
            date_of_birth: db.date_of_birth,
            blood_group: db.blood_group,
            phone: db.phone,
            allergies: db.allergies,
            last_visit: db.last_visit,
            total_visits: db.total_visits,
        }
    }
}

/// 数据库就诊记录表（关联医生姓名）
#[derive(Debug, FromRow)]
pub struct DbHealthRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub visit_date: DateTime<Utc>,
}

impl DbHealthRecord {
    /// 组装处方与检验结果
    pub fn into_record(
        self,
        prescriptions: Vec<Prescription>,
        test_results: Vec<TestResult>,
    ) -> HealthRecord {
        HealthRecord {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            diagnosis: self.diagnosis,
            symptoms: self.symptoms,
            notes: self.notes,
            visit_date: self.visit_date,
            prescriptions,
            test_results,
        }
    }
}

/// 数据库处方表
#[derive(Debug, FromRow)]
pub struct DbPrescription {
    pub id: Uuid,
    pub health_record_id: Uuid,
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}

impl From<DbPrescription> for Prescription {
    fn from(db: DbPrescription) -> Self {
        Prescription {
            id: db.id,
            medication: db.medication,
            dosage: db.dosage,
            frequency: db.frequency,
            duration: db.duration,
        }
    }
}

/// 数据库检验结果表
#[derive(Debug, FromRow)]
pub struct DbTestResult {
    pub id: Uuid,
    pub health_record_id: Uuid,
    pub test_name: String,
    pub result: String,
    pub normal_range: Option<String>,
    pub test_date: Option<DateTime<Utc>>,
}

impl From<DbTestResult> for TestResult {
    fn from(db: DbTestResult) -> Self {
        TestResult {
            id: db.id,
            test_name: db.test_name,
            result: db.result,
            normal_range: db.normal_range,
            test_date: db.test_date,
        }
    }
}

/// 数据库风险分析表
#[derive(Debug, FromRow)]
pub struct DbRiskAnalysis {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub risk_factors: Vec<String>,
    pub predictions: String,
    pub recommendations: String,
    pub risk_score: i32,
    pub analyzed_at: DateTime<Utc>,
}

impl From<DbRiskAnalysis> for RiskAnalysis {
    fn from(db: DbRiskAnalysis) -> Self {
        RiskAnalysis {
            id: db.id,
            patient_id: db.patient_id,
            risk_factors: db.risk_factors,
            predictions: db.predictions,
            recommendations: db.recommendations,
            risk_score: db.risk_score,
            analyzed_at: db.analyzed_at,
        }
    }
}

// 插入模型 - 用于创建新记录

/// 新用户插入模型
#[derive(Debug)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// 新患者档案
#[derive(Debug, Default)]
pub struct NewPatientProfile {
    pub date_of_birth: Option<DateTime<Utc>>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
}

/// 新医生档案
#[derive(Debug, Default)]
pub struct NewDoctorProfile {
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
}

/// 注册时随用户一并创建的角色档案
#[derive(Debug)]
pub enum NewProfile {
    Patient(NewPatientProfile),
    Doctor(NewDoctorProfile),
}

/// 新就诊记录插入模型
#[derive(Debug)]
pub struct NewHealthRecord {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub prescriptions: Vec<NewPrescription>,
    pub test_results: Vec<NewTestResult>,
}
