//! 애플리케이션 상태 관리.
//!
//! 모든 API 핸들러에서 공유하는 상태를 정의합니다.
//! 저장소는 생성 시점에 명시적 핸들로 주입되며, 같은 저장소 인스턴스가
//! 인증 엔진, 인가 게이트, 수집 태스크에 공유됩니다.

use std::sync::Arc;

use fxgate_core::{
    AppConfig, Clock, ExchangeRatesRepository, RefreshTokenRepository, SettingsProvider,
    UserRepository,
};

use crate::auth::{AuthorizationGate, EmailAuthEngine, TokenCodec};
use crate::tasks::ExchangeRatesTask;

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 이메일/비밀번호 인증 엔진
    pub auth_engine: EmailAuthEngine,

    /// Access Token 검증 및 인가
    pub gate: AuthorizationGate,

    /// 환율 수집 태스크
    pub exchange_rates: Arc<ExchangeRatesTask>,

    /// 사용자 조회 (리소스 핸들러용)
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// 하나의 저장소로 모든 구성 요소를 연결합니다.
    ///
    /// # Arguments
    /// * `store` - 네 가지 저장소 trait을 모두 구현한 저장소 (`MemoryStore`, `PgStore`)
    /// * `config` - 애플리케이션 설정
    /// * `clock` - 토큰 발급/검증과 수집 시각에 사용할 시계
    /// * `http` - 환율 제공자 호출용 HTTP 클라이언트
    pub fn from_store<S>(
        store: Arc<S>,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        http: reqwest::Client,
    ) -> Self
    where
        S: UserRepository
            + RefreshTokenRepository
            + ExchangeRatesRepository
            + SettingsProvider
            + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let refresh_tokens: Arc<dyn RefreshTokenRepository> = store.clone();
        let records: Arc<dyn ExchangeRatesRepository> = store.clone();
        let settings: Arc<dyn SettingsProvider> = store;

        let codec = TokenCodec::new(config.auth.jwt_secret.clone());

        let auth_engine = EmailAuthEngine::new(
            users.clone(),
            refresh_tokens,
            settings.clone(),
            codec.clone(),
            clock.clone(),
        );
        let gate = AuthorizationGate::new(users.clone(), settings, codec, clock.clone());
        let exchange_rates = Arc::new(ExchangeRatesTask::new(
            http,
            config.exchange_rates.clone(),
            users.clone(),
            records,
            clock,
        ));

        Self {
            auth_engine,
            gate,
            exchange_rates,
            users,
        }
    }
}
