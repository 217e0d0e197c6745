//! 健康数据存储接口
//!
//! AI 流程只依赖这里声明的读写能力，具体实现位于数据库模块。

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{HealthRecord, NewRiskAnalysis, Patient, RiskAnalysis};

/// 健康数据存储
#[async_trait]
pub trait HealthDataStore: Send + Sync {
    /// 根据用户ID查找患者
    async fn find_patient_by_user(&self, user_id: Uuid) -> Result<Option<Patient>>;

    /// 获取患者就诊记录（按就诊时间倒序），`limit` 为空时返回全部
    async fn health_records_for_patient(
        &self,
        patient_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HealthRecord>>;

    /// 保存风险分析
    async fn insert_risk_analysis(&self, analysis: &NewRiskAnalysis) -> Result<RiskAnalysis>;
}
