//! Refresh Token 레코드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 저장된 Refresh Token.
///
/// 로그인 성공 시마다 새로 생성되며, 이전 토큰은 무효화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// 불투명한 랜덤 문자열 (유일)
    pub value: String,
    /// 소유 사용자 ID
    pub user_id: Uuid,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(value: impl Into<String>, user_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            user_id,
            created_at,
        }
    }
}
