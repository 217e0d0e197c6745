//! 关键词规则分类器
//!
//! 模型输出不可用时，根据就诊诊断文本生成确定性的风险分析。
//! 每条规则独立匹配（小写子串），命中即追加风险因素并累加分值；
//! 最终分值从基础分起累加，只设上限。

use carelink_core::HealthRecord;

use crate::risk::{RiskAssessment, MAX_RISK_SCORE};

/// 基础风险分
pub const BASE_RISK_SCORE: u8 = 3;

/// 没有任何规则命中时使用的通用风险因素
pub const GENERIC_RISK_FACTORS: [&str; 2] = [
    "General health monitoring recommended",
    "Preventive care suggested",
];

/// 固定的七项建议
pub const STANDARD_RECOMMENDATIONS: &str = "1. Schedule regular check-ups with your healthcare provider every 3-6 months\n\
2. Maintain a balanced diet rich in fruits, vegetables, and whole grains\n\
3. Exercise regularly for at least 30 minutes daily\n\
4. Take all prescribed medications as directed\n\
5. Monitor your vital signs regularly\n\
6. Avoid smoking and limit alcohol consumption\n\
7. Manage stress through relaxation techniques";

/// 关键词规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// 任一关键词命中即视为匹配（小写）
    pub keywords: Vec<&'static str>,
    pub risk_factor: &'static str,
    pub weight: u8,
}

impl KeywordRule {
    pub fn new(keywords: &[&'static str], risk_factor: &'static str, weight: u8) -> Self {
        Self {
            keywords: keywords.to_vec(),
            risk_factor,
            weight,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// 默认规则集，按顺序决定风险因素的排列
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            &["hypertension", "blood pressure"],
            "Hypertension detected in medical history",
            2,
        ),
        KeywordRule::new(&["diabetes"], "Diabetes management required", 2),
        KeywordRule::new(&["heart", "cardiac"], "Cardiovascular concerns identified", 3),
        KeywordRule::new(&["cholesterol"], "Cholesterol level monitoring needed", 1),
    ]
}

/// 关键词规则分类器
#[derive(Debug, Clone)]
pub struct FallbackClassifier {
    rules: Vec<KeywordRule>,
    base_score: u8,
    max_score: u8,
}

impl FallbackClassifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            base_score: BASE_RISK_SCORE,
            max_score: MAX_RISK_SCORE,
        }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// 根据就诊记录的诊断生成分析
    pub fn classify_records(&self, records: &[HealthRecord]) -> RiskAssessment {
        self.classify(records.iter().map(|r| r.diagnosis.as_str()))
    }

    /// 根据诊断文本生成分析
    pub fn classify<'a, I>(&self, diagnoses: I) -> RiskAssessment
    where
        I: IntoIterator<Item = &'a str>,
    {
        let diagnoses: Vec<String> = diagnoses
            .into_iter()
            .map(|d| d.trim().to_lowercase())
            .collect();
        // 以换行拼接，避免关键词跨越两条诊断
        let text = diagnoses.join("\n");

        let mut risk_factors = Vec::new();
        let mut score = u32::from(self.base_score);

        for rule in self.rules.iter().filter(|rule| rule.matches(&text)) {
            risk_factors.push(rule.risk_factor.to_string());
            score += u32::from(rule.weight);
        }

        if risk_factors.is_empty() {
            risk_factors.extend(GENERIC_RISK_FACTORS.iter().map(|f| f.to_string()));
        }

        RiskAssessment {
            risk_factors,
            predictions: predictions_text(&diagnoses),
            recommendations: STANDARD_RECOMMENDATIONS.to_string(),
            risk_score: score.min(u32::from(self.max_score)) as u8,
        }
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// 以去重后的诊断生成预测文本
fn predictions_text(diagnoses: &[String]) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for diagnosis in diagnoses.iter().map(String::as_str) {
        if !diagnosis.is_empty() && !distinct.contains(&diagnosis) {
            distinct.push(diagnosis);
        }
    }

    format!(
        "Based on your health records showing {}, continued monitoring and adherence to your treatment plan is recommended. \
Regular check-ups with your healthcare provider are important to manage these conditions effectively.",
        distinct.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(diagnoses: &[&str]) -> RiskAssessment {
        FallbackClassifier::default().classify(diagnoses.iter().copied())
    }

    #[test]
    fn test_single_keyword_scores() {
        let cases = [
            ("Hypertension diagnosed", 5, "Hypertension detected in medical history"),
            ("Type 2 Diabetes", 5, "Diabetes management required"),
            ("Cardiac arrhythmia", 6, "Cardiovascular concerns identified"),
            ("High cholesterol", 4, "Cholesterol level monitoring needed"),
        ];

        for (diagnosis, score, factor) in cases {
            let result = classify(&[diagnosis]);
            assert_eq!(result.risk_score, score, "diagnosis {}", diagnosis);
            assert_eq!(result.risk_factors, vec![factor.to_string()]);
        }
    }

    #[test]
    fn test_alternate_keywords_match_same_rule() {
        let result = classify(&["Elevated BLOOD PRESSURE"]);
        assert_eq!(result.risk_score, 5);
        assert_eq!(result.risk_factors.len(), 1);

        let result = classify(&["Heart murmur"]);
        assert_eq!(result.risk_score, 6);
    }

    #[test]
    fn test_rules_accumulate_across_records() {
        let result = classify(&["Hypertension", "Type 2 diabetes mellitus"]);
        assert_eq!(result.risk_score, 7);
        assert_eq!(
            result.risk_factors,
            vec![
                "Hypertension detected in medical history".to_string(),
                "Diabetes management required".to_string(),
            ]
        );
    }

    #[test]
    fn test_repeated_matches_count_once() {
        let result = classify(&["Hypertension", "hypertension follow-up", "High blood pressure"]);
        assert_eq!(result.risk_score, 5);
        assert_eq!(result.risk_factors.len(), 1);
    }

    #[test]
    fn test_no_match_uses_generic_factors() {
        let result = classify(&["Seasonal allergies", "Sprained ankle"]);
        assert_eq!(result.risk_score, BASE_RISK_SCORE);
        assert_eq!(
            result.risk_factors,
            GENERIC_RISK_FACTORS.iter().map(|f| f.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_score_is_capped() {
        let result = classify(&["Cardiac arrest", "Hypertension", "Diabetes"]);
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_factors.len(), 3);

        let result = classify(&["Cardiac arrest", "Hypertension", "Diabetes", "High cholesterol"]);
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_factors.len(), 4);
    }

    #[test]
    fn test_keywords_do_not_span_records() {
        let result = classify(&["low blood", "pressure ulcer"]);
        assert_eq!(result.risk_score, BASE_RISK_SCORE);
    }

    #[test]
    fn test_predictions_list_distinct_diagnoses() {
        let result = classify(&["Hypertension", "hypertension", "Asthma"]);
        assert!(result
            .predictions
            .starts_with("Based on your health records showing hypertension, asthma, continued monitoring"));
    }

    #[test]
    fn test_recommendations_are_fixed_list() {
        let result = classify(&["Anything"]);
        assert_eq!(result.recommendations.lines().count(), 7);
        assert!(result.recommendations.starts_with("1. Schedule regular check-ups"));
        assert!(result.recommendations.ends_with("7. Manage stress through relaxation techniques"));
    }

    #[test]
    fn test_custom_rules() {
        let classifier = FallbackClassifier::new(vec![KeywordRule::new(&["asthma"], "Respiratory risk", 4)]);
        assert_eq!(classifier.rules().len(), 1);
        let result = classifier.classify(["Asthma"]);
        assert_eq!(result.risk_score, 7);
        assert_eq!(result.risk_factors, vec!["Respiratory risk".to_string()]);
    }
}
