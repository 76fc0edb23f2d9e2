//! 설정 관리.
//!
//! 기본값, 선택적 TOML 파일, `FXGATE__` 접두사 환경 변수 순서로 설정을 병합합니다.
//!
//! # 환경 변수 예시
//!
//! - `FXGATE__DATABASE__URL=postgres://localhost/fxgate`
//! - `FXGATE__AUTH__JWT_SECRET=...`
//! - `FXGATE__AUTH__ACCESS_TOKEN_TIMEOUT_MINUTES=15`
//! - `FXGATE__EXCHANGE_RATES__INTERVAL_MINUTES=60`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 환율 수집 설정
    #[serde(default)]
    pub exchange_rates: ExchangeRatesConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 URL
    #[serde(default)]
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키
    pub jwt_secret: String,
    /// Access Token 유효 시간 (분). DB 설정값이 없을 때의 기본값.
    pub access_token_timeout_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-key-change-in-production".to_string(),
            access_token_timeout_minutes: 15,
        }
    }
}

/// 환율 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeRatesConfig {
    /// 주기 수집 활성화 여부
    pub enabled: bool,
    /// 제공자 URL
    pub provider_url: String,
    /// 추출할 통화 코드
    pub currency: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 수집 주기 (분)
    pub interval_minutes: u64,
    /// 주기 수집을 실행할 사용자 이메일
    #[serde(default)]
    pub actor_email: Option<String>,
}

impl Default for ExchangeRatesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider_url: "https://www.cbr-xml-daily.ru/latest.js".to_string(),
            currency: "USD".to_string(),
            request_timeout_secs: 10,
            interval_minutes: 60,
            actor_email: None,
        }
    }
}

impl ExchangeRatesConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 수집 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();
        let builder = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.connection_timeout_secs", 30)?
            .set_default("auth.jwt_secret", defaults.auth.jwt_secret)?
            .set_default(
                "auth.access_token_timeout_minutes",
                defaults.auth.access_token_timeout_minutes,
            )?
            .set_default("exchange_rates.enabled", false)?
            .set_default("exchange_rates.provider_url", defaults.exchange_rates.provider_url)?
            .set_default("exchange_rates.currency", defaults.exchange_rates.currency)?
            .set_default("exchange_rates.request_timeout_secs", 10)?
            .set_default("exchange_rates.interval_minutes", 60)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("FXGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증.
    ///
    /// # Errors
    ///
    /// - 수집 주기 또는 요청 타임아웃이 0
    /// - Access Token 유효 시간이 0 이하이거나 표현 가능한 범위를 벗어남
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let minutes = self.auth.access_token_timeout_minutes;
        if minutes <= 0 || chrono::Duration::try_minutes(minutes).is_none() {
            return Err(config::ConfigError::Message(format!(
                "auth.access_token_timeout_minutes 범위 오류: {}",
                minutes
            )));
        }

        if self.exchange_rates.interval_minutes == 0 {
            return Err(config::ConfigError::Message(
                "exchange_rates.interval_minutes는 1 이상이어야 합니다".to_string(),
            ));
        }

        if self.exchange_rates.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "exchange_rates.request_timeout_secs는 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}
