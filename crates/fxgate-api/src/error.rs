//! API 에러 응답.
//!
//! [`ServiceError`]를 HTTP 상태 코드와 일관된 JSON 본문으로 변환합니다.
//!
//! | 에러 | 상태 코드 |
//! |---|---|
//! | `AuthCredentialsInvalid`, `Unauthenticated` | 401 |
//! | `Forbidden` | 403 |
//! | `InvalidInput` | 400 |
//! | `NotFound` | 404 |
//! | `ServerError` | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use fxgate_core::ServiceError;

/// 통합 API 에러 응답 본문.
///
/// ```json
/// {
///   "code": "FORBIDDEN",
///   "message": "권한이 부족합니다",
///   "timestamp": 1686916800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "TOKEN_EXPIRED", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러 에러 래퍼.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// 에러 종류에 대응하는 HTTP 상태 코드.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::AuthCredentialsInvalid | ServiceError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 서버 에러의 상세 사유는 로그에만 남김
        let message = match &self.0 {
            ServiceError::ServerError(failure) => {
                error!(error = %failure, "서버 에러");
                "서버 내부 오류가 발생했습니다".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiErrorResponse::new(self.0.code(), message))).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
