//! 按客户端IP的固定窗口限流

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use carelink_core::CareError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::handlers::ApiError;

/// 窗口条目数超过该值时清理过期窗口
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// 限流判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// 超出限额，附带距窗口结束的时间
    Limited { retry_after: Duration },
}

/// 固定窗口限流器
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    message: String,
    skip_successful_requests: bool,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32, message: impl Into<String>) -> Self {
        Self {
            window,
            max_requests,
            message: message.into(),
            skip_successful_requests: false,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// 成功响应（状态码小于400）不计数
    pub fn skip_successful_requests(mut self) -> Self {
        self.skip_successful_requests = true;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 检查客户端是否仍有配额；计数模式下同时占用一次配额
    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().await;

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        if !self.skip_successful_requests {
            entry.count += 1;
        }
        Decision::Allowed
    }

    /// 记录一次失败请求（仅在跳过成功请求时使用）
    async fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now()).await
    }

    async fn record_failure_at(&self, key: &str, now: Instant) {
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count += 1;
    }
}

/// 各类接口使用的限流器
#[derive(Clone)]
pub struct RateLimits {
    pub api: Arc<RateLimiter>,
    pub auth: Arc<RateLimiter>,
    pub search: Arc<RateLimiter>,
    pub ai: Arc<RateLimiter>,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            api: Arc::new(RateLimiter::new(
                Duration::from_secs(15 * 60),
                100,
                "Too many requests from this IP, please try again later",
            )),
            auth: Arc::new(
                RateLimiter::new(
                    Duration::from_secs(15 * 60),
                    5,
                    "Too many authentication attempts, please try again later",
                )
                .skip_successful_requests(),
            ),
            search: Arc::new(RateLimiter::new(
                Duration::from_secs(60),
                30,
                "Too many search requests, please slow down",
            )),
            ai: Arc::new(RateLimiter::new(
                Duration::from_secs(60),
                5,
                "AI request limit reached, please wait before making more requests",
            )),
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 限流中间件
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if let Decision::Limited { retry_after } = limiter.check(&key).await {
        warn!("Rate limit exceeded for {} on {}", key, request.uri().path());

        let mut response = ApiError(CareError::RateLimited(limiter.message().to_string())).into_response();
        // 向上取整到秒
        let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds.max(1)));
        return response;
    }

    let response = next.run(request).await;

    if limiter.skip_successful_requests && response.status().as_u16() >= 400 {
        limiter.record_failure(&key).await;
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_within_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2, "slow down");
        let start = Instant::now();

        assert_eq!(limiter.check_at("1.2.3.4", start).await, Decision::Allowed);
        assert_eq!(limiter.check_at("1.2.3.4", start).await, Decision::Allowed);
        assert_eq!(
            limiter.check_at("1.2.3.4", start + Duration::from_secs(15)).await,
            Decision::Limited {
                retry_after: Duration::from_secs(45)
            }
        );

        // 其他客户端不受影响
        assert_eq!(limiter.check_at("5.6.7.8", start).await, Decision::Allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1, "slow down");
        let start = Instant::now();

        assert_eq!(limiter.check_at("a", start).await, Decision::Allowed);
        assert!(matches!(limiter.check_at("a", start).await, Decision::Limited { .. }));
        assert_eq!(
            limiter.check_at("a", start + Duration::from_secs(60)).await,
            Decision::Allowed
        );
    }

    #[tokio::test]
    async fn test_skip_successful_counts_only_failures() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2, "slow down").skip_successful_requests();
        let start = Instant::now();

        for _ in 0..5 {
            assert_eq!(limiter.check_at("a", start).await, Decision::Allowed);
        }

        limiter.record_failure_at("a", start).await;
        assert_eq!(limiter.check_at("a", start).await, Decision::Allowed);
        limiter.record_failure_at("a", start).await;
        assert!(matches!(limiter.check_at("a", start).await, Decision::Limited { .. }));
    }

    #[test]
    fn test_default_limits() {
        let limits = RateLimits::default();
        assert_eq!(limits.api.max_requests, 100);
        assert_eq!(limits.auth.window, Duration::from_secs(900));
        assert!(limits.auth.skip_successful_requests);
        assert_eq!(limits.search.max_requests, 30);
        assert_eq!(limits.ai.max_requests, 5);
    }
}
