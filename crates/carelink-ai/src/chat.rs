//! 健康助手对话服务

use carelink_core::{CareError, HealthDataStore, Result};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::generator::TextGenerator;
use crate::prompts::chat_prompt;

/// 默认带入提示词的就诊记录条数
pub const DEFAULT_HISTORY_LIMIT: i64 = 5;

/// 对话服务
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn HealthDataStore>,
    generator: Arc<dyn TextGenerator>,
    history_limit: i64,
}

impl ChatService {
    pub fn new(store: Arc<dyn HealthDataStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit.max(0);
        self
    }

    /// 结合患者最近的就诊记录回答问题
    pub async fn reply(&self, user_id: Uuid, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(CareError::Validation("Message is required".to_string()));
        }

        let patient = self
            .store
            .find_patient_by_user(user_id)
            .await?
            .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;

        let records = self
            .store
            .health_records_for_patient(patient.id, Some(self.history_limit))
            .await?;
        debug!(
            "Answering chat for patient {} with {} records",
            patient.id,
            records.len()
        );

        let prompt = chat_prompt(&records, message)?;
        let failed = || CareError::AiService("Failed to generate AI response".to_string());
        self.generator
            .generate(&prompt)
            .await
            .map_err(|e| {
                error!("Text generation failed for patient {}: {}", patient.id, e);
                failed()
            })?
            .ok_or_else(failed)
    }
}
