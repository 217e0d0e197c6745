//! 风险分析提取与校验
//!
//! 模型被要求只返回一个 JSON 对象，但实际输出经常带有 Markdown 代码围栏，
//! 甚至完全不是 JSON。这里负责把原始文本转成经过校验的 [`RiskAssessment`]；
//! 无法使用时交给 [`FallbackClassifier`] 生成确定性的分析结果。

use carelink_core::{HealthRecord, NewRiskAnalysis};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

use crate::classifier::FallbackClassifier;

/// 风险评分下限
pub const MIN_RISK_SCORE: u8 = 1;
/// 风险评分上限
pub const MAX_RISK_SCORE: u8 = 10;

/// 代码围栏标记：开头的 ```/```json（可带换行）与结尾的 ```（可带前置换行）
const FENCE_PATTERN: &str = r"```(?i:json)?[ \t]*\r?\n?|\r?\n?```";

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(FENCE_PATTERN).ok())
        .as_ref()
}

/// 经过校验的风险分析内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub risk_factors: Vec<String>,
    pub predictions: String,
    pub recommendations: String,
    pub risk_score: u8,
}

impl RiskAssessment {
    pub fn into_new_analysis(self, patient_id: Uuid) -> NewRiskAnalysis {
        NewRiskAnalysis {
            patient_id,
            risk_factors: self.risk_factors,
            predictions: self.predictions,
            recommendations: self.recommendations,
            risk_score: i32::from(self.risk_score),
        }
    }
}

/// 结构校验失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("Invalid risk factors format")]
    RiskFactors,
    #[error("Invalid predictions format")]
    Predictions,
    #[error("Invalid recommendations format")]
    Recommendations,
    #[error("Invalid risk score")]
    RiskScore,
}

/// 模型输出被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseRejection {
    #[error("no response text")]
    Empty,
    #[error("malformed JSON: {0}")]
    Malformed(String),
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),
}

/// 分析结果来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    /// 模型输出通过校验
    Model,
    /// 模型输出不可用，使用关键词规则
    Fallback(ResponseRejection),
}

/// 一次分析的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub assessment: RiskAssessment,
    pub source: AnalysisSource,
}

impl AnalysisOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, AnalysisSource::Fallback(_))
    }
}

/// 去除代码围栏并裁剪空白
pub fn strip_code_fences(raw: &str) -> String {
    match fence_regex() {
        Some(fence) => fence.replace_all(raw, "").trim().to_string(),
        None => raw.replace("```json", "").replace("```", "").trim().to_string(),
    }
}

/// 按约定结构校验已解析的 JSON
pub fn validate_assessment(value: &Value) -> Result<RiskAssessment, SchemaViolation> {
    let object = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let risk_factors = object
        .get("riskFactors")
        .and_then(Value::as_array)
        .ok_or(SchemaViolation::RiskFactors)?
        .iter()
        .map(|factor| factor.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(SchemaViolation::RiskFactors)?;

    let predictions = non_empty_string(object.get("predictions")).ok_or(SchemaViolation::Predictions)?;
    let recommendations =
        non_empty_string(object.get("recommendations")).ok_or(SchemaViolation::Recommendations)?;

    let risk_score = object
        .get("riskScore")
        .and_then(Value::as_f64)
        .filter(|score| {
            score.fract() == 0.0
                && *score >= f64::from(MIN_RISK_SCORE)
                && *score <= f64::from(MAX_RISK_SCORE)
        })
        .ok_or(SchemaViolation::RiskScore)? as u8;

    Ok(RiskAssessment {
        risk_factors,
        predictions,
        recommendations,
        risk_score,
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 提取并校验模型输出
pub fn parse_assessment(raw: &str) -> Result<RiskAssessment, ResponseRejection> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ResponseRejection::Empty);
    }

    tracing::debug!("Cleaned AI response: {}", cleaned);

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ResponseRejection::Malformed(e.to_string()))?;

    Ok(validate_assessment(&value)?)
}

/// 分析模型输出，不可用时退回关键词规则
pub fn analyze_response(
    raw: &str,
    records: &[HealthRecord],
    classifier: &FallbackClassifier,
) -> AnalysisOutcome {
    match parse_assessment(raw) {
        Ok(assessment) => AnalysisOutcome {
            assessment,
            source: AnalysisSource::Model,
        },
        Err(rejection) => fallback_outcome(rejection, records, classifier),
    }
}

/// 使用关键词规则生成结果
pub fn fallback_outcome(
    rejection: ResponseRejection,
    records: &[HealthRecord],
    classifier: &FallbackClassifier,
) -> AnalysisOutcome {
    AnalysisOutcome {
        assessment: classifier.classify_records(records),
        source: AnalysisSource::Fallback(rejection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(diagnosis: &str) -> HealthRecord {
        HealthRecord {
            id: Uuid::new_v4(),
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            doctor_name: None,
            diagnosis: diagnosis.to_string(),
            symptoms: None,
            notes: None,
            visit_date: Utc::now(),
            prescriptions: Vec::new(),
            test_results: Vec::new(),
        }
    }

    fn valid_json() -> Value {
        json!({
            "riskFactors": ["Elevated blood pressure", "Sedentary lifestyle"],
            "predictions": "Moderate risk of cardiovascular events. Continued monitoring advised.",
            "recommendations": "1. Reduce salt\n2. Walk daily",
            "riskScore": 6
        })
    }

    #[test]
    fn test_fenced_and_unfenced_inputs_strip_identically() {
        let body = valid_json().to_string();
        let pretty = serde_json::to_string_pretty(&valid_json()).unwrap();

        for inner in [body.as_str(), pretty.as_str()] {
            let plain = strip_code_fences(inner);
            assert_eq!(strip_code_fences(&format!("```json\n{}\n```", inner)), plain);
            assert_eq!(strip_code_fences(&format!("```\n{}\n```", inner)), plain);
            assert_eq!(strip_code_fences(&format!("```json{}```", inner)), plain);
            assert_eq!(strip_code_fences(&format!("  ```JSON\r\n{}\r\n```  ", inner)), plain);
        }
    }

    #[test]
    fn test_fence_pattern_compiles() {
        assert!(fence_regex().is_some());
    }

    #[test]
    fn test_strip_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("no json here"), "no json here");
    }

    #[test]
    fn test_valid_response_is_accepted() {
        let raw = format!("```json\n{}\n```", valid_json());
        let assessment = parse_assessment(&raw).unwrap();
        assert_eq!(assessment.risk_score, 6);
        assert_eq!(assessment.risk_factors.len(), 2);
        assert!(assessment.recommendations.starts_with("1."));
    }

    #[test]
    fn test_missing_fields_are_schema_violations() {
        let cases = [
            ("riskFactors", SchemaViolation::RiskFactors),
            ("predictions", SchemaViolation::Predictions),
            ("recommendations", SchemaViolation::Recommendations),
            ("riskScore", SchemaViolation::RiskScore),
        ];

        for (field, expected) in cases {
            let mut value = valid_json();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(validate_assessment(&value), Err(expected));
        }
    }

    #[test]
    fn test_wrong_types_are_schema_violations() {
        let mut value = valid_json();
        value["riskFactors"] = json!("Hypertension");
        assert_eq!(validate_assessment(&value), Err(SchemaViolation::RiskFactors));

        let mut value = valid_json();
        value["riskFactors"] = json!(["ok", 3]);
        assert_eq!(validate_assessment(&value), Err(SchemaViolation::RiskFactors));

        let mut value = valid_json();
        value["predictions"] = json!(42);
        assert_eq!(validate_assessment(&value), Err(SchemaViolation::Predictions));

        let mut value = valid_json();
        value["recommendations"] = json!("");
        assert_eq!(validate_assessment(&value), Err(SchemaViolation::Recommendations));

        let mut value = valid_json();
        value["riskScore"] = json!("7");
        assert_eq!(validate_assessment(&value), Err(SchemaViolation::RiskScore));

        assert_eq!(validate_assessment(&json!([1, 2])), Err(SchemaViolation::NotAnObject));
    }

    #[test]
    fn test_risk_score_range() {
        for score in [json!(0), json!(11), json!(-1), json!(6.5), json!(100.0)] {
            let mut value = valid_json();
            value["riskScore"] = score.clone();
            assert_eq!(
                validate_assessment(&value),
                Err(SchemaViolation::RiskScore),
                "score {} should be rejected",
                score
            );
        }

        for (score, expected) in [(json!(1), 1u8), (json!(10), 10), (json!(7.0), 7)] {
            let mut value = valid_json();
            value["riskScore"] = score;
            assert_eq!(validate_assessment(&value).unwrap().risk_score, expected);
        }
    }

    #[test]
    fn test_malformed_and_empty_responses() {
        assert!(matches!(
            parse_assessment("Sure! Here is the analysis: {riskFactors: ...}"),
            Err(ResponseRejection::Malformed(_))
        ));
        assert_eq!(parse_assessment("   "), Err(ResponseRejection::Empty));
        assert_eq!(parse_assessment("```json\n```"), Err(ResponseRejection::Empty));
    }

    #[test]
    fn test_invalid_output_falls_back_to_rules() {
        let classifier = FallbackClassifier::default();
        let records = vec![record("Type 2 Diabetes")];

        let mut value = valid_json();
        value["riskScore"] = json!(42);
        let outcome = analyze_response(&value.to_string(), &records, &classifier);

        assert!(outcome.is_fallback());
        assert_eq!(
            outcome.source,
            AnalysisSource::Fallback(ResponseRejection::Schema(SchemaViolation::RiskScore))
        );
        assert_eq!(outcome.assessment.risk_score, 5);
        assert_eq!(outcome.assessment.risk_factors, vec!["Diabetes management required"]);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let classifier = FallbackClassifier::default();
        let records = vec![record("Hypertension")];
        let raw = format!("```json\n{}\n```", valid_json());

        let first = analyze_response(&raw, &records, &classifier);
        let second = analyze_response(&raw, &records, &classifier);
        assert_eq!(first, second);
        assert_eq!(first.source, AnalysisSource::Model);

        let broken = analyze_response("not json", &records, &classifier);
        assert_eq!(broken, analyze_response("not json", &records, &classifier));
    }

    #[test]
    fn test_into_new_analysis() {
        let patient_id = Uuid::new_v4();
        let analysis = parse_assessment(&valid_json().to_string())
            .unwrap()
            .into_new_analysis(patient_id);
        assert_eq!(analysis.patient_id, patient_id);
        assert_eq!(analysis.risk_score, 6);
    }
}
