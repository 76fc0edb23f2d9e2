//! 인증/인가 및 환율 수집 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 이메일/비밀번호 인증 엔진 (JWT Access Token + 불투명 Refresh Token)
//! - 역할 기반 인가 게이트 (401/403 구분)
//! - 환율 수집 태스크와 주기 실행기
//! - PostgreSQL 저장소
//! - Axum 기반 REST API
//!
//! # 모듈 구성
//!
//! - [`auth`]: 인증 엔진, 인가 게이트, JWT, 비밀번호 해싱
//! - [`tasks`]: 환율 수집
//! - [`repository`]: PostgreSQL 저장소
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`error`]: HTTP 에러 응답

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;
pub mod tasks;

pub use auth::{AuthSession, AuthorizationGate, Claims, EmailAuthEngine, TokenCodec};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use repository::PgStore;
pub use routes::create_api_router;
pub use state::AppState;
pub use tasks::{start_exchange_rates_collector, ExchangeRatesTask};
