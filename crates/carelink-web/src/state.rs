//! 路由共享状态

use carelink_ai::{ChatService, PredictionService};
use carelink_database::DatabaseQueries;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::rate_limit::RateLimits;

#[derive(Clone)]
pub struct AppState {
    pub queries: DatabaseQueries,
    pub auth: Arc<AuthService>,
    pub prediction: PredictionService,
    pub chat: ChatService,
    pub limits: RateLimits,
}
