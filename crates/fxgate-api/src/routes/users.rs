//! 사용자 조회 endpoint.
//!
//! `GET /api/v1/users/{user_id}`. `user_id`는 UUID 또는 `me`입니다.
//! 관리자는 모든 사용자를, 일반 운영자는 본인만 조회할 수 있습니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use fxgate_core::{PublicUser, ServiceError};

use crate::auth::{check_access, AccessToken};
use crate::error::ApiResult;
use crate::state::AppState;

/// 토큰 사용자 자신을 가리키는 경로 값.
pub const ME: &str = "me";

/// 사용자 조회.
///
/// GET /api/v1/users/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AccessToken(token): AccessToken,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    // 경로 값 검사보다 토큰 검증이 먼저
    let caller = state.gate.authenticate_token(&token).await?;
    if user_id == ME {
        return Ok(Json(caller.to_public()));
    }

    let owner = Uuid::parse_str(&user_id)
        .map_err(|_| ServiceError::InvalidInput(format!("잘못된 사용자 ID: {}", user_id)))?;

    check_access(&caller, owner)?;
    if caller.id == owner {
        return Ok(Json(caller.to_public()));
    }

    let user = state
        .users
        .find_by_id(owner)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound(format!("사용자 {}", owner)))?;

    Ok(Json(user.to_public()))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/{user_id}", get(get_user))
}
