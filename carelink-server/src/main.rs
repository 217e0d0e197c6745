//! CareLink服务器主程序

mod settings;

use anyhow::{Context, Result};
use carelink_ai::{ChatService, GeminiClient, GeminiSettings, PredictionService};
use carelink_database::{DatabasePool, DatabaseQueries, PoolSettings};
use carelink_web::{AppState, AuthService, AuthSettings, RateLimiter, RateLimits, WebServer};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::settings::{CareLinkConfig, RateLimitRule};

/// CareLink服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "carelink-server")]
#[command(about = "CareLink 医疗健康档案与 AI 风险分析服务")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 服务器端口（覆盖配置）
    #[arg(short, long)]
    port: Option<u16>,

    /// 日志级别（覆盖配置与 RUST_LOG）
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = CareLinkConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // 初始化日志
    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting CareLink server...");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("CareLink configuration:");
    info!("  Listen address: {}", addr);
    info!("  AI model: {}", config.ai.model);
    info!("  Keyword fallback on empty response: {}", config.ai.fallback_on_empty_response);

    // 数据库
    let pool = DatabasePool::connect(&PoolSettings {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout: Duration::from_secs(config.database.connect_timeout_secs),
    })
    .await?;
    let queries = DatabaseQueries::new(pool);
    queries.create_tables().await?;

    // AI 服务
    let generator = Arc::new(GeminiClient::new(GeminiSettings {
        api_key: config.ai.api_key.clone(),
        base_url: config.ai.base_url.clone(),
        model: config.ai.model.clone(),
        timeout: Duration::from_secs(config.ai.request_timeout_secs),
    })?);
    let store = Arc::new(queries.clone());

    let prediction = PredictionService::new(store.clone(), generator.clone())
        .with_fallback_on_empty_response(config.ai.fallback_on_empty_response);
    let chat = ChatService::new(store, generator).with_history_limit(config.ai.chat_history_limit);

    let auth = Arc::new(AuthService::new(&AuthSettings {
        jwt_secret: config.auth.jwt_secret.clone(),
        token_expiry_hours: config.auth.token_expiry_hours,
        bcrypt_cost: config.auth.bcrypt_cost,
    }));

    let state = AppState {
        queries,
        auth,
        prediction,
        chat,
        limits: rate_limits(&config),
    };

    if let Err(e) = WebServer::new(addr, state).run().await {
        error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// 按配置构建限流器，沿用默认的提示信息
fn rate_limits(config: &CareLinkConfig) -> RateLimits {
    let defaults = RateLimits::default();
    let limiter = |rule: RateLimitRule, template: &RateLimiter| {
        RateLimiter::new(
            Duration::from_secs(rule.window_secs),
            rule.max_requests,
            template.message(),
        )
    };

    RateLimits {
        api: Arc::new(limiter(config.rate_limit.api, &defaults.api)),
        auth: Arc::new(limiter(config.rate_limit.auth, &defaults.auth).skip_successful_requests()),
        search: Arc::new(limiter(config.rate_limit.search, &defaults.search)),
        ai: Arc::new(limiter(config.rate_limit.ai, &defaults.ai)),
    }
}
