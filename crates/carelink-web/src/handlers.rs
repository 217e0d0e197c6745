//! 通用HTTP处理器与错误响应

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use carelink_core::CareError;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

/// HTTP 层错误，包装统一错误类型并负责转换为 JSON 响应
#[derive(Debug)]
pub struct ApiError(pub CareError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<CareError> for ApiError {
    fn from(err: CareError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CareError::Validation(_) => StatusCode::BAD_REQUEST,
            CareError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CareError::Forbidden(_) => StatusCode::FORBIDDEN,
            CareError::NotFound(_) | CareError::NotFoundWithHint { .. } => StatusCode::NOT_FOUND,
            CareError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 错误处理
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0 {
            CareError::NotFoundWithHint { message, hint } => json!({
                "error": message,
                "hint": hint,
                "status": status.as_u16()
            }),
            CareError::AiService(message) => {
                error!("AI service error: {}", message);
                json!({ "error": message, "status": status.as_u16() })
            }
            err if err.is_server_error() => {
                // 内部细节只写日志
                error!("Request failed: {}", err);
                json!({ "error": "Internal server error", "status": status.as_u16() })
            }
            err => json!({ "error": err.to_string(), "status": status.as_u16() }),
        };

        (status, Json(body)).into_response()
    }
}

/// JSON 请求体提取器，请求体无法解析时同样返回统一格式的错误
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CareError::Validation(rejection.body_text()))
    }
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// 未匹配路由
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_of(err: CareError) -> (StatusCode, Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = body_of(CareError::Validation("Message is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
        assert_eq!(body["status"], 400);

        let (status, _) = body_of(CareError::Forbidden("nope".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = body_of(CareError::RateLimited("slow down".into())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_not_found_with_hint() {
        let (status, body) = body_of(CareError::NotFoundWithHint {
            message: "Patient not found".into(),
            hint: "search first".into(),
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Patient not found");
        assert_eq!(body["hint"], "search first");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = body_of(CareError::Database("password authentication failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = body_of(CareError::AiService("Failed to generate AI response".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate AI response");
    }
}
