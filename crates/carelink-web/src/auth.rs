//! 用户认证和授权

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use carelink_core::{utils::non_blank, CareError, Result, Role, UserAccount};
use carelink_database::{NewDoctorProfile, NewPatientProfile, NewProfile, NewUser};
use chrono::{DateTime, NaiveDate, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::handlers::{ApiJson, ApiResult};
use crate::state::AppState;

/// 认证配置
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
    pub bcrypt_cost: u32,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_expiry_hours: 24 * 7,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,  // 用户ID
    role: String, // 角色
    iat: i64,     // 签发时间
    exp: i64,     // 过期时间
}

/// 已认证用户，由认证中间件写入请求扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// 认证服务
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            token_expiry_hours: settings.token_expiry_hours,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }

    /// 签发JWT token
    pub fn issue_token(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.token_expiry_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CareError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// 验证JWT token
    pub fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| CareError::Unauthorized("Invalid token".to_string()))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| CareError::Unauthorized("Invalid token".to_string()))?;
        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|_| CareError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser { user_id, role })
    }

    /// 计算密码哈希
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CareError::Internal(e.to_string()))?
            .map_err(|e| CareError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// 校验密码，哈希格式错误同样视为不匹配
    pub async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

/// 认证中间件
pub async fn authenticate(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| CareError::Unauthorized("Authentication required".to_string()))?;

    let user = auth_service.verify_token(token.trim())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// 角色守卫，需位于认证中间件之后
pub async fn require_role(
    State(role): State<Role>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| CareError::Unauthorized("Authentication required".to_string()))?;

    if user.role != role {
        warn!("User {} with role {} denied access to {}", user.user_id, user.role, request.uri().path());
        return Err(CareError::Forbidden("Insufficient permissions".to_string()).into());
    }

    Ok(next.run(request).await)
}

/// 注册请求，角色档案字段与账户字段平铺
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub phone: Option<String>,
    pub allergies: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 认证响应
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserAccount,
}

/// 校验后的注册信息
struct Registration {
    email: String,
    password: String,
    name: String,
    role: Role,
    profile: NewProfile,
}

impl RegisterRequest {
    fn validate(self) -> Result<Registration> {
        let (email, password, name) = match (
            non_blank(self.email),
            non_blank(self.password),
            non_blank(self.name),
        ) {
            (Some(email), Some(password), Some(name)) => (email, password, name),
            _ => {
                return Err(CareError::Validation(
                    "Email, password and name are required".to_string(),
                ))
            }
        };

        let role = non_blank(self.role)
            .ok_or_else(|| CareError::Validation("Role is required".to_string()))?
            .parse::<Role>()?;

        let profile = match role {
            Role::Patient => NewProfile::Patient(NewPatientProfile {
                date_of_birth: non_blank(self.date_of_birth)
                    .map(|v| parse_date(&v))
                    .transpose()?,
                blood_group: non_blank(self.blood_group),
                phone: non_blank(self.phone),
                allergies: non_blank(self.allergies),
            }),
            Role::Doctor => NewProfile::Doctor(NewDoctorProfile {
                specialization: non_blank(self.specialization),
                license_number: non_blank(self.license_number),
                phone: non_blank(self.phone),
            }),
        };

        Ok(Registration {
            email: email.trim().to_lowercase(),
            password,
            name: name.trim().to_string(),
            role,
            profile,
        })
    }
}

/// 解析出生日期，接受 RFC 3339 时间或 YYYY-MM-DD
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CareError::Validation(format!("Invalid date of birth: {}", value)))
}

/// 注册处理器
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registration = request.validate()?;
    info!("Registration attempt for {} as {}", registration.email, registration.role);

    let password_hash = state.auth.hash_password(&registration.password).await?;
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: registration.email,
        password_hash,
        name: registration.name,
        role: registration.role,
    };

    let account = state
        .queries
        .create_account(&new_user, &registration.profile)
        .await?;
    let token = state.auth.issue_token(account.user.id, account.user.role)?;

    info!("User registered: {}", account.user.id);
    Ok(Json(AuthResponse { token, user: account }))
}

/// 登录处理器
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let invalid = || CareError::Unauthorized("Invalid credentials".to_string());

    let (email, password) = match (non_blank(request.email), request.password) {
        (Some(email), Some(password)) => (email.trim().to_lowercase(), password),
        _ => return Err(invalid().into()),
    };

    info!("Login attempt for user: {}", email);

    let db_user = match state.queries.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!("Login failed: unknown email {}", email);
            return Err(invalid().into());
        }
    };

    if !state.auth.verify_password(&password, &db_user.password_hash).await {
        warn!("Login failed: wrong password for {}", email);
        return Err(invalid().into());
    }

    let account = state.queries.load_account(db_user).await?;
    let token = state.auth.issue_token(account.user.id, account.user.role)?;

    info!("User logged in successfully: {}", account.user.id);
    Ok(Json(AuthResponse { token, user: account }))
}
