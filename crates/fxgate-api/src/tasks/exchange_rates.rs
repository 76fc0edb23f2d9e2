//! 환율 수집 태스크.
//!
//! 공개 환율 제공자(`{rates: {CODE: number, ...}}` 형식)에서 설정된 통화의 환율을
//! 가져와 [`ExchangeRatesRecord`]로 저장합니다.
//!
//! - 성공: 기록 1건 저장
//! - 실패 (제공자 비정상 응답, 전송 실패, 파싱 실패, 통화 누락, 수집 주체 없음):
//!   `ServiceError::ServerError`, 저장 없음
//!
//! 태스크 내부에서는 재시도하지 않습니다. 주기 실행은
//! [`start_exchange_rates_collector`]가 담당하며 실패 시 다음 주기를 기다립니다.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use fxgate_core::config::ExchangeRatesConfig;
use fxgate_core::{
    Clock, ExchangeRatesRecord, ExchangeRatesRepository, ServerFailure, ServiceResult,
    UserRepository,
};

/// 제공자 응답 중 사용하는 부분.
///
/// 다른 통화 값의 형식은 검사하지 않습니다.
#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: HashMap<String, serde_json::Value>,
}

/// 응답 본문에서 통화 환율 추출.
///
/// # Errors
///
/// - `ServerFailure::Payload`: JSON 형식 오류, `rates` 누락, 해당 통화 값이 숫자가 아님
/// - `ServerFailure::MissingRate`: 해당 통화 키 없음
pub fn extract_rate(body: &[u8], currency: &str) -> Result<Decimal, ServerFailure> {
    let payload: RatesPayload =
        serde_json::from_slice(body).map_err(|e| ServerFailure::Payload(e.to_string()))?;

    let value = payload
        .rates
        .get(currency)
        .ok_or_else(|| ServerFailure::MissingRate(currency.to_string()))?;

    let number = match value {
        serde_json::Value::Number(number) => number,
        other => {
            return Err(ServerFailure::Payload(format!(
                "{} 환율이 숫자가 아님: {}",
                currency, other
            )))
        }
    };

    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ServerFailure::Payload(format!("{} 환율 변환 실패 ({}): {}", currency, text, e)))
}

/// 환율 수집 태스크.
pub struct ExchangeRatesTask {
    client: reqwest::Client,
    config: ExchangeRatesConfig,
    users: Arc<dyn UserRepository>,
    records: Arc<dyn ExchangeRatesRepository>,
    clock: Arc<dyn Clock>,
}

impl ExchangeRatesTask {
    pub fn new(
        client: reqwest::Client,
        config: ExchangeRatesConfig,
        users: Arc<dyn UserRepository>,
        records: Arc<dyn ExchangeRatesRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            config,
            users,
            records,
            clock,
        }
    }

    /// 수집 설정.
    pub fn config(&self) -> &ExchangeRatesConfig {
        &self.config
    }

    /// 제공자에서 설정된 통화의 환율 조회 (저장 없음).
    pub async fn fetch_rate(&self) -> Result<Decimal, ServerFailure> {
        debug!(url = %self.config.provider_url, "환율 제공자 요청");

        let response = self
            .client
            .get(&self.config.provider_url)
            .timeout(self.config.request_timeout())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ServerFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerFailure::ProviderStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServerFailure::Transport(e.to_string()))?;

        extract_rate(&body, &self.config.currency)
    }

    /// 수집 1회 실행.
    ///
    /// 수집 주체 확인, 환율 조회, 기록 저장 순으로 진행하며
    /// 어느 단계든 실패하면 저장 없이 `ServerError`를 반환합니다.
    pub async fn run(&self, actor_id: Uuid) -> ServiceResult<ExchangeRatesRecord> {
        if self.users.find_by_id(actor_id).await?.is_none() {
            warn!(actor_id = %actor_id, "수집 주체 사용자가 없습니다");
            return Err(ServerFailure::UnknownActor(actor_id).into());
        }

        let rate = match self.fetch_rate().await {
            Ok(rate) => rate,
            Err(failure) => {
                warn!(
                    actor_id = %actor_id,
                    currency = %self.config.currency,
                    error = %failure,
                    "환율 수집 실패"
                );
                return Err(failure.into());
            }
        };

        let record = ExchangeRatesRecord::new(actor_id, rate, self.clock.now());
        self.records.insert(&record).await?;

        info!(
            actor_id = %actor_id,
            currency = %self.config.currency,
            rate = %rate,
            "환율 수집 완료"
        );

        Ok(record)
    }
}

/// 환율 주기 수집기 시작.
///
/// 시작 즉시 1회 수집한 뒤 `collect_interval`마다 반복합니다.
/// 실패는 로그만 남기고 다음 주기를 기다립니다.
///
/// # Arguments
/// * `task` - 수집 태스크
/// * `actor_id` - 수집 주체 사용자
/// * `collect_interval` - 수집 주기
/// * `shutdown_token` - 종료 시그널 토큰
pub fn start_exchange_rates_collector(
    task: Arc<ExchangeRatesTask>,
    actor_id: Uuid,
    collect_interval: Duration,
    shutdown_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            actor_id = %actor_id,
            interval_secs = collect_interval.as_secs(),
            currency = %task.config().currency,
            "환율 수집기 시작"
        );

        if collect_interval.is_zero() {
            error!("환율 수집 주기는 0보다 커야 합니다. 수집기를 시작하지 않습니다");
            return;
        }

        // 첫 tick은 즉시 발생
        let mut ticker = interval(collect_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = task.run(actor_id).await {
                        error!(error = %e, "환율 수집 배치 실패");
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("환율 수집기: 종료 시그널 수신");
                    break;
                }
            }
        }

        info!("환율 수집기 종료됨");
    })
}
