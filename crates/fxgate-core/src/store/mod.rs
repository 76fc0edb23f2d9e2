//! 영속성 경계.
//!
//! 인증 엔진, 인가 게이트, 수집 태스크는 이 trait들을 통해서만 저장소에 접근합니다.
//! 구현체는 생성 시점에 `Arc<dyn ...>` 핸들로 주입되며 전역 상태를 사용하지 않습니다.
//!
//! - [`MemoryStore`]: 프로세스 내 구현 (테스트, 로컬 실행)
//! - PostgreSQL 구현은 `fxgate-api`의 `repository` 모듈에 있습니다.

mod memory;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::{ExchangeRatesRecord, RefreshToken, User};
use crate::error::StorageError;

pub use memory::MemoryStore;

/// 사용자 저장소.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 정규화된 이메일로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// ID로 사용자 조회.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    /// 사용자 생성.
    ///
    /// # Errors
    ///
    /// - `StorageError::Conflict`: 같은 이메일의 사용자가 이미 존재
    async fn create(&self, user: &User) -> Result<(), StorageError>;
}

/// Refresh Token 저장소.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// 새 토큰 저장.
    async fn insert(&self, token: &RefreshToken) -> Result<(), StorageError>;

    /// 토큰 값으로 조회.
    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, StorageError>;

    /// 사용자의 모든 토큰 조회 (생성 순).
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, StorageError>;
}

/// 환율 기록 저장소.
#[async_trait]
pub trait ExchangeRatesRepository: Send + Sync {
    /// 새 기록 저장.
    async fn insert(&self, record: &ExchangeRatesRecord) -> Result<(), StorageError>;

    /// 수집 주체별 기록 조회 (수집 순).
    async fn list_for_actor(&self, actor_id: Uuid)
        -> Result<Vec<ExchangeRatesRecord>, StorageError>;
}

/// 읽기 전용 설정값 제공자.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Access Token 유효 시간.
    async fn access_token_timeout(&self) -> Result<Duration, StorageError>;
}
