//! 数据库连接管理

use carelink_core::{CareError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// 连接池参数
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl PoolSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
    }
}

/// 数据库连接池
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// 建立连接池并立即连接
    pub async fn connect(settings: &PoolSettings) -> Result<Self> {
        let pool = settings
            .options()
            .connect(&settings.url)
            .await
            .map_err(|e| CareError::Database(e.to_string()))?;

        info!(
            "Database pool connected (max_connections={})",
            settings.max_connections
        );
        Ok(Self { pool })
    }

    /// 建立惰性连接池，首次查询时才真正连接
    pub fn connect_lazy(settings: &PoolSettings) -> Result<Self> {
        let pool = settings
            .options()
            .connect_lazy(&settings.url)
            .map_err(|e| CareError::Database(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
