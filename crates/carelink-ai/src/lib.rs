//! # CareLink AI
//!
//! 基于生成式模型的健康风险预测与健康助手对话。
//!
//! ## 主要功能
//!
//! - 模型输出的提取与结构校验
//! - 关键词规则兜底分析
//! - 提示词构建
//! - Gemini 文本生成客户端
//! - 预测与对话服务

pub mod chat;
pub mod classifier;
pub mod generator;
pub mod prediction;
pub mod prompts;
pub mod risk;

pub use chat::ChatService;
pub use classifier::{FallbackClassifier, KeywordRule};
pub use generator::{GeminiClient, GeminiSettings, TextGenerator};
pub use prediction::PredictionService;
pub use risk::{analyze_response, parse_assessment, AnalysisOutcome, AnalysisSource, RiskAssessment};
