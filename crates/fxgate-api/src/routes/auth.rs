//! 로그인 endpoint.
//!
//! `POST /api/v1/auth`
//!
//! ```json
//! { "engine": "email", "credentials": { "email": "...", "password": "..." } }
//! ```

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use fxgate_core::{Credentials, PublicUser, ServiceError};

use crate::error::ApiResult;
use crate::state::AppState;

/// 지원하는 인증 엔진 이름.
pub const EMAIL_ENGINE: &str = "email";

fn default_engine() -> String {
    EMAIL_ENGINE.to_string()
}

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// 인증 엔진 (현재 "email"만 지원)
    #[serde(default = "default_engine")]
    pub engine: String,
    pub credentials: Credentials,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// 자격증명으로 토큰 쌍 발급.
///
/// POST /api/v1/auth
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if req.engine != EMAIL_ENGINE {
        return Err(ServiceError::InvalidInput(format!(
            "지원하지 않는 인증 엔진: {}",
            req.engine
        ))
        .into());
    }

    let session = state.auth_engine.authenticate(&req.credentials).await?;

    Ok(Json(AuthResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        user: session.user.to_public(),
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(login))
}
