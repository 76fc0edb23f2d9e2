//! 시계 추상화.
//!
//! 토큰 만료 판정과 기록 타임스탬프는 모두 [`Clock`]을 통해 현재 시각을 얻습니다.
//! 테스트에서는 [`ManualClock`]으로 시간을 앞당겨 만료 경계를 검증합니다.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// 현재 시각 제공자.
pub trait Clock: Send + Sync {
    /// 현재 UTC 시각.
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 벽시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 조작하는 시계.
///
/// # 사용 예시
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use fxgate_core::{Clock, ManualClock};
///
/// let start = Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(Duration::minutes(16));
/// assert_eq!(clock.now(), start + Duration::minutes(16));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// 주어진 시각에서 시작하는 시계 생성.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// 시간을 앞으로 이동.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// 시각을 직접 설정.
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
