//! # FxGate Core
//!
//! 인증/인가 및 환율 수집 시스템의 핵심 도메인 모델과 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 사용자, 역할, 권한(capability) 모델
//! - Refresh Token 및 환율 기록 모델
//! - 저장소 trait 및 인메모리 구현
//! - 제어 가능한 시계(Clock)
//! - 설정 관리 및 로깅 인프라
//! - 서비스 에러 분류

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use domain::*;
pub use error::*;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use store::{
    ExchangeRatesRepository, MemoryStore, RefreshTokenRepository, SettingsProvider,
    UserRepository,
};
