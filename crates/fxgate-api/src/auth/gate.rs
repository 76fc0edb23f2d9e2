//! 인가 게이트.
//!
//! Access Token을 검증하고, 요청된 리소스 소유자와 토큰 사용자를 비교해
//! 접근 허용 여부를 결정합니다.
//!
//! | 토큰 사용자 역할 | 본인 리소스 | 타인 리소스 |
//! |---|---|---|
//! | Administrator | 허용 | 허용 |
//! | StandardOperator | 허용 | `Forbidden` |

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use fxgate_core::{
    Capability, Clock, ServiceError, ServiceResult, SettingsProvider, UnauthenticatedReason, User,
    UserRepository,
};

use super::jwt::TokenCodec;

/// 토큰 검증 및 인가 판단기.
pub struct AuthorizationGate {
    users: Arc<dyn UserRepository>,
    settings: Arc<dyn SettingsProvider>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(
        users: Arc<dyn UserRepository>,
        settings: Arc<dyn SettingsProvider>,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            settings,
            codec,
            clock,
        }
    }

    /// Access Token 검증 후 토큰 사용자 반환.
    ///
    /// 만료 기준은 `exp_ms`와 `iat_ms + 현재 설정된 유효 시간` 중 이른 시각이며
    /// 밀리초 단위로 비교합니다.
    pub async fn authenticate_token(&self, token: &str) -> ServiceResult<User> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| UnauthenticatedReason::InvalidToken)?;

        let now = self.clock.now();
        let timeout = self.settings.access_token_timeout().await?;
        let deadline_ms = claims
            .exp_ms
            .min(claims.iat_ms.saturating_add(timeout.num_milliseconds()));
        if now.timestamp_millis() >= deadline_ms {
            debug!(sub = %claims.sub, "만료된 토큰");
            return Err(UnauthenticatedReason::TokenExpired.into());
        }

        let subject = claims
            .subject_id()
            .map_err(|_| UnauthenticatedReason::InvalidToken)?;

        match self.users.find_by_id(subject).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %subject, "토큰 사용자를 찾을 수 없습니다");
                Err(UnauthenticatedReason::UnknownSubject.into())
            }
        }
    }

    /// 소유자 범위 리소스 접근 인가.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Unauthenticated`: 토큰 검증 실패
    /// - `ServiceError::Forbidden`: 타인 리소스에 대한 권한 없음
    pub async fn authorize(&self, token: &str, resource_owner: Uuid) -> ServiceResult<User> {
        let user = self.authenticate_token(token).await?;
        check_access(&user, resource_owner)?;
        Ok(user)
    }
}

/// 역할과 소유자 비교로 접근 허용 여부 판단.
pub fn check_access(user: &User, resource_owner: Uuid) -> ServiceResult<()> {
    if user.id == resource_owner || user.has_capability(Capability::ReadAny) {
        return Ok(());
    }

    warn!(
        user_id = %user.id,
        role = %user.role,
        resource_owner = %resource_owner,
        "타인 리소스 접근 거부"
    );
    Err(ServiceError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use fxgate_core::{ManualClock, MemoryStore, Role};

    const SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    struct Fixture {
        gate: AuthorizationGate,
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        codec: TokenCodec,
        admin: User,
        operator: User,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap()
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new(15));
        let clock = Arc::new(ManualClock::new(start()));
        let codec = TokenCodec::new(SECRET);

        let admin = User::new("super_admin@example.com", "hash", Role::Administrator, start());
        let operator = User::new("operator@example.com", "hash", Role::StandardOperator, start());
        store.create(&admin).await.unwrap();
        store.create(&operator).await.unwrap();

        let gate = AuthorizationGate::new(store.clone(), store.clone(), codec.clone(), clock.clone());
        Fixture {
            gate,
            store,
            clock,
            codec,
            admin,
            operator,
        }
    }

    fn token_for(f: &Fixture, user: &User) -> String {
        f.codec
            .issue(user, f.clock.now(), Duration::minutes(15))
            .unwrap()
            .0
    }

    fn assert_unauthenticated(result: ServiceResult<User>, expected: UnauthenticatedReason) {
        match result {
            Err(ServiceError::Unauthenticated(reason)) => assert_eq!(reason, expected),
            other => panic!("expected Unauthenticated({:?}), got {:?}", expected, other),
        }
    }

    #[tokio::test]
    async fn test_admin_can_access_any_owner() {
        let f = fixture().await;
        let token = token_for(&f, &f.admin);

        let user = f.gate.authorize(&token, f.operator.id).await.unwrap();
        assert_eq!(user.id, f.admin.id);
        assert!(f.gate.authorize(&token, f.admin.id).await.is_ok());
        // 존재하지 않는 소유자도 관리자에게는 허용 (존재 여부는 핸들러 책임)
        assert!(f.gate.authorize(&token, Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_operator_limited_to_own_resources() {
        let f = fixture().await;
        let token = token_for(&f, &f.operator);

        let user = f.gate.authorize(&token, f.operator.id).await.unwrap();
        assert_eq!(user.id, f.operator.id);

        let denied = f.gate.authorize(&token, f.admin.id).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn test_token_expires_at_timeout_boundary() {
        let f = fixture().await;
        let token = token_for(&f, &f.operator);

        f.clock.advance(Duration::minutes(15) - Duration::seconds(1));
        assert!(f.gate.authorize(&token, f.operator.id).await.is_ok());

        f.clock.advance(Duration::seconds(1));
        assert_unauthenticated(
            f.gate.authorize(&token, f.operator.id).await,
            UnauthenticatedReason::TokenExpired,
        );

        f.clock.advance(Duration::minutes(1));
        assert_unauthenticated(
            f.gate.authenticate_token(&token).await,
            UnauthenticatedReason::TokenExpired,
        );
    }

    #[tokio::test]
    async fn test_sub_second_issue_time_expires_exactly_at_timeout() {
        let f = fixture().await;
        f.clock.set(start() + Duration::milliseconds(900));
        let token = token_for(&f, &f.operator);

        f.clock.advance(Duration::minutes(15) - Duration::milliseconds(500));
        assert!(f.gate.authorize(&token, f.operator.id).await.is_ok());

        f.clock.advance(Duration::milliseconds(499));
        assert!(f.gate.authorize(&token, f.operator.id).await.is_ok());

        f.clock.advance(Duration::milliseconds(1));
        assert_unauthenticated(
            f.gate.authorize(&token, f.operator.id).await,
            UnauthenticatedReason::TokenExpired,
        );
    }

    #[tokio::test]
    async fn test_shortened_timeout_applies_to_issued_tokens() {
        let f = fixture().await;
        let token = token_for(&f, &f.admin);

        f.store.set_access_token_timeout_minutes(5);
        f.clock.advance(Duration::minutes(6));
        assert_unauthenticated(
            f.gate.authenticate_token(&token).await,
            UnauthenticatedReason::TokenExpired,
        );
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_unauthenticated() {
        let f = fixture().await;

        assert_unauthenticated(
            f.gate.authenticate_token("garbage").await,
            UnauthenticatedReason::InvalidToken,
        );

        let (forged, _) = TokenCodec::new("another-secret-key-for-testing-minimum-32-chars")
            .issue(&f.admin, f.clock.now(), Duration::minutes(15))
            .unwrap();
        assert_unauthenticated(
            f.gate.authorize(&forged, f.admin.id).await,
            UnauthenticatedReason::InvalidToken,
        );
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthenticated() {
        let f = fixture().await;
        let ghost = User::new("ghost@example.com", "hash", Role::Administrator, start());
        let token = token_for(&f, &ghost);

        assert_unauthenticated(
            f.gate.authenticate_token(&token).await,
            UnauthenticatedReason::UnknownSubject,
        );
    }

    #[test]
    fn test_check_access_rules() {
        let admin = User::new("a@example.com", "hash", Role::Administrator, start());
        let operator = User::new("o@example.com", "hash", Role::StandardOperator, start());

        assert!(check_access(&admin, operator.id).is_ok());
        assert!(check_access(&operator, operator.id).is_ok());
        assert!(matches!(
            check_access(&operator, admin.id),
            Err(ServiceError::Forbidden)
        ));
    }
}
