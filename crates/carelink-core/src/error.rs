//! 错误定义模块

use thiserror::Error;

/// CareLink系统统一错误类型
#[derive(Error, Debug)]
pub enum CareError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// 带提示信息的未找到错误，提示会随响应一并返回
    #[error("{message}")]
    NotFoundWithHint { message: String, hint: String },

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    AiService(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl CareError {
    /// 是否为服务端错误（需要记录 error 日志）
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            CareError::Config(_)
                | CareError::Database(_)
                | CareError::AiService(_)
                | CareError::Internal(_)
                | CareError::Serialization(_)
                | CareError::Io(_)
        )
    }
}

/// CareLink系统统一结果类型
pub type Result<T> = std::result::Result<T, CareError>;
