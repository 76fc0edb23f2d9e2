//! API 라우트 모듈.
//!
//! - `/api/v1/auth`: 로그인
//! - `/api/v1/users`: 사용자 조회 (소유자 범위 인가)
//! - `/api/v1/exchange-rates`: 환율 즉시 수집
//! - `/api/v1/ping`: 생존 확인

pub mod auth;
pub mod exchange_rates;
pub mod ping;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub use auth::{auth_router, AuthRequest, AuthResponse};
pub use exchange_rates::exchange_rates_router;
pub use ping::{ping_router, PingResponse};
pub use users::users_router;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/v1/auth", auth_router())
        .nest("/api/v1/users", users_router())
        .nest("/api/v1/exchange-rates", exchange_rates_router())
        .nest("/api/v1/ping", ping_router())
}
