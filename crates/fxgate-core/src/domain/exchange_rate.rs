//! 환율 수집 기록.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 환율 수집 기록.
///
/// 수집 태스크가 성공했을 때만 생성되며 이후 수정/삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRatesRecord {
    /// 기록 ID
    pub id: Uuid,
    /// 수집을 실행한 사용자
    pub actor_id: Uuid,
    /// 추출한 환율 (RUB 기준 1단위당 대상 통화)
    pub rate: Decimal,
    /// 수집 시각
    pub captured_at: DateTime<Utc>,
}

impl ExchangeRatesRecord {
    pub fn new(actor_id: Uuid, rate: Decimal, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            rate,
            captured_at,
        }
    }
}
