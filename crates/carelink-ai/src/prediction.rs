//! 健康风险预测服务

use carelink_core::{CareError, HealthDataStore, Result, RiskAnalysis};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classifier::FallbackClassifier;
use crate::generator::TextGenerator;
use crate::prompts::prediction_prompt;
use crate::risk::{analyze_response, fallback_outcome, AnalysisSource, ResponseRejection};

/// 风险预测服务
#[derive(Clone)]
pub struct PredictionService {
    store: Arc<dyn HealthDataStore>,
    generator: Arc<dyn TextGenerator>,
    classifier: FallbackClassifier,
    fallback_on_empty_response: bool,
}

impl PredictionService {
    pub fn new(store: Arc<dyn HealthDataStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            classifier: FallbackClassifier::default(),
            fallback_on_empty_response: true,
        }
    }

    pub fn with_classifier(mut self, classifier: FallbackClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// 模型无响应时是否使用关键词规则
    pub fn with_fallback_on_empty_response(mut self, enabled: bool) -> Self {
        self.fallback_on_empty_response = enabled;
        self
    }

    /// 为用户对应的患者生成并保存风险分析
    pub async fn predict_for_user(&self, user_id: Uuid) -> Result<RiskAnalysis> {
        let patient = self
            .store
            .find_patient_by_user(user_id)
            .await?
            .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;

        let records = self
            .store
            .health_records_for_patient(patient.id, None)
            .await?;
        if records.is_empty() {
            return Err(CareError::Validation(
                "No health records available for analysis".to_string(),
            ));
        }

        let prompt = prediction_prompt(&patient, &records)?;
        let response = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Text generation failed for patient {}: {}", patient.id, e);
            CareError::AiService("Failed to generate AI prediction".to_string())
        })?;
        let outcome = match response {
            Some(raw) => analyze_response(&raw, &records, &self.classifier),
            None if self.fallback_on_empty_response => {
                fallback_outcome(ResponseRejection::Empty, &records, &self.classifier)
            }
            None => {
                return Err(CareError::AiService(
                    "Failed to generate AI prediction".to_string(),
                ))
            }
        };

        match &outcome.source {
            AnalysisSource::Model => {
                info!("AI risk analysis accepted for patient {}", patient.id);
            }
            AnalysisSource::Fallback(reason) => {
                warn!(
                    "Using keyword fallback for patient {}: {}",
                    patient.id, reason
                );
            }
        }

        let analysis = outcome.assessment.into_new_analysis(patient.id);
        self.store.insert_risk_analysis(&analysis).await
    }
}
