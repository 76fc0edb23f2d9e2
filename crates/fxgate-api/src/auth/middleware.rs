//! Axum용 인증 추출기.
//!
//! 요청 헤더에서 Access Token을 꺼내고, 필요하면 [`AuthorizationGate`](super::AuthorizationGate)로
//! 토큰 사용자를 확인합니다. 실패 시 핸들러에 도달하기 전에 401을 반환합니다.
//!
//! 지원하는 헤더:
//! - `Authorization: Bearer <token>`
//! - `X-Auth-Token: <token>`

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use fxgate_core::{UnauthenticatedReason, User};

use crate::error::ApiError;
use crate::state::AppState;

/// 토큰 전용 헤더 이름.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// 헤더에서 추출한 원문 Access Token.
///
/// 소유자 범위 인가가 필요한 핸들러는 이 값을 게이트에 그대로 넘깁니다.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// 헤더에서 토큰 추출.
pub fn extract_token(headers: &HeaderMap) -> Result<String, UnauthenticatedReason> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| UnauthenticatedReason::InvalidAuthHeader)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(UnauthenticatedReason::InvalidAuthHeader)?
            .trim();
        if token.is_empty() {
            return Err(UnauthenticatedReason::InvalidAuthHeader);
        }
        return Ok(token.to_string());
    }

    match headers.get(AUTH_TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(UnauthenticatedReason::InvalidAuthHeader),
        None => Err(UnauthenticatedReason::MissingToken),
    }
}

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_token(&parts.headers)
            .map(AccessToken)
            .map_err(|reason| ApiError(reason.into()))
    }
}

/// 검증된 토큰 사용자.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AccessToken(token) = AccessToken::from_request_parts(parts, state).await?;
        let user = state.gate.authenticate_token(&token).await?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_custom_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        assert_eq!(
            extract_token(&HeaderMap::new()),
            Err(UnauthenticatedReason::MissingToken)
        );

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(
            extract_token(&headers),
            Err(UnauthenticatedReason::InvalidAuthHeader)
        );

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(
            extract_token(&headers),
            Err(UnauthenticatedReason::InvalidAuthHeader)
        );
    }
}
