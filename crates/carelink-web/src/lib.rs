//! # CareLink Web
//!
//! HTTP 接口层：路由、认证与角色校验、限流、错误响应。

pub mod ai;
pub mod auth;
pub mod doctor;
pub mod handlers;
pub mod patient;
pub mod rate_limit;
pub mod server;
pub mod state;

pub use auth::{AuthService, AuthSettings, AuthUser};
pub use handlers::{ApiError, ApiJson, ApiResult};
pub use rate_limit::{RateLimiter, RateLimits};
pub use server::{create_app, WebServer};
pub use state::AppState;
