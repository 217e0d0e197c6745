//! 配置管理
//!
//! 加载顺序：内置默认值 → 配置文件（可选）→ `CARELINK__` 前缀环境变量 →
//! 常用环境变量（`DATABASE_URL`、`JWT_SECRET`、`GEMINI_API_KEY`、`PORT`）。

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// 常用环境变量与配置键的对应关系
const WELL_KNOWN_VARS: [(&str, &str); 4] = [
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("GEMINI_API_KEY", "ai.api_key"),
    ("PORT", "server.port"),
];

/// CareLink 完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareLinkConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
    pub bcrypt_cost: u32,
}

/// AI 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// 模型无响应时是否使用关键词规则
    pub fallback_on_empty_response: bool,
    /// 对话时带入的就诊记录条数
    pub chat_history_limit: i64,
}

/// 单个限流规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub window_secs: u64,
    pub max_requests: u32,
}

/// 限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub api: RateLimitRule,
    pub auth: RateLimitRule,
    pub search: RateLimitRule,
    pub ai: RateLimitRule,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_hours: 24 * 7,
            bcrypt_cost: 10,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            request_timeout_secs: 30,
            fallback_on_empty_response: true,
            chat_history_limit: 5,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            api: RateLimitRule {
                window_secs: 15 * 60,
                max_requests: 100,
            },
            auth: RateLimitRule {
                window_secs: 15 * 60,
                max_requests: 5,
            },
            search: RateLimitRule {
                window_secs: 60,
                max_requests: 30,
            },
            ai: RateLimitRule {
                window_secs: 60,
                max_requests: 5,
            },
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CareLinkConfig {
    /// 从配置文件和进程环境加载
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// 加载配置，常用环境变量通过 `lookup` 读取
    pub fn load_with<F>(config_path: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::try_from(&CareLinkConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CARELINK")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in WELL_KNOWN_VARS {
            let value = lookup(var).filter(|v| !v.trim().is_empty());
            builder = builder
                .set_override_option(key, value)
                .with_context(|| format!("Failed to apply {}", var))?;
        }

        let config: CareLinkConfig = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(config)
    }

    /// 启动前校验必填项
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("DATABASE_URL is not defined (database.url)");
        }
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET is not defined (auth.jwt_secret)");
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            bail!("auth.bcrypt_cost must be between 4 and 31");
        }
        for (name, rule) in [
            ("api", self.rate_limit.api),
            ("auth", self.rate_limit.auth),
            ("search", self.rate_limit.search),
            ("ai", self.rate_limit.ai),
        ] {
            if rule.window_secs == 0 || rule.max_requests == 0 {
                bail!("rate_limit.{} must have a non-zero window and request limit", name);
            }
        }
        Ok(())
    }
}
