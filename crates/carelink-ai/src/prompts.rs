//! 提示词构建

use carelink_core::{HealthRecord, Patient, Result};

/// 健康助手对话提示词
pub fn chat_prompt(records: &[HealthRecord], message: &str) -> Result<String> {
    let health_context = if records.is_empty() {
        "No health records available.".to_string()
    } else {
        format!(
            "Patient's recent health history:\n{}",
            serde_json::to_string_pretty(records)?
        )
    };

    Ok(format!(
        "You are a helpful health assistant. \n\n\
{health_context}\n\n\
Patient's question: {message}\n\n\
Provide helpful health advice based on their health history, but always remind them to consult their doctor for medical decisions. \
Keep your response concise and easy to understand."
    ))
}

/// 风险预测提示词，要求模型只返回约定结构的 JSON 对象
pub fn prediction_prompt(patient: &Patient, records: &[HealthRecord]) -> Result<String> {
    let history = serde_json::to_string_pretty(records)?;
    let blood_group = patient
        .blood_group
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("Not specified");
    let allergies = patient
        .allergies
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("None reported");
    let date_of_birth = patient
        .date_of_birth
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Not specified".to_string());

    Ok(format!(
        r#"You are a medical AI analyzing health records for risk prediction.

Analyze this patient's complete health history:
{history}

Patient Information:
- Blood Group: {blood_group}
- Allergies: {allergies}
- Date of Birth: {date_of_birth}

Based on this information, provide a comprehensive health risk analysis. You MUST respond with ONLY a valid JSON object in this EXACT format:

{{
  "riskFactors": ["factor1", "factor2", "factor3"],
  "predictions": "Detailed prediction text explaining potential health risks",
  "recommendations": "Detailed recommendations for prevention and management",
  "riskScore": 5
}}

Important:
- riskFactors: Array of specific health risk factors identified (minimum 2, maximum 5)
- predictions: String with detailed health risk predictions (2-3 sentences)
- recommendations: String with actionable health recommendations (numbered list format)
- riskScore: Number from 1-10 (1=very low risk, 10=very high risk)

Respond ONLY with the JSON object, no markdown formatting, no other text before or after."#
    ))
}
