//! Access Token 코덱.
//!
//! HS256 서명 JWT를 발급하고 서명을 검증합니다. 만료 판정은 코덱이 아닌
//! 인가 게이트가 [`Clock`](fxgate_core::Clock) 기준으로 수행하므로,
//! 디코딩 시 `exp` 검증은 끄고 서명과 형식만 확인합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fxgate_core::{Role, User};

/// Refresh Token 문자열 길이.
const REFRESH_TOKEN_LEN: usize = 64;

/// JWT Access Token 페이로드.
///
/// `iat`/`exp`는 표준 클레임(초 단위)이고, 만료 판정은 밀리초 단위인
/// `iat_ms`/`exp_ms`로 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 발급 시점의 사용자 역할
    pub role: Role,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// 발급 시각 (Unix 밀리초)
    pub iat_ms: i64,
    /// 만료 시각 (Unix 밀리초)
    pub exp_ms: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    /// 발급 시각과 유효 시간으로 Claims 생성.
    ///
    /// 만료 시각이 표현 범위를 벗어나면 `JwtError::TimeoutOutOfRange`.
    pub fn new(
        user_id: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at
            .checked_add_signed(timeout)
            .ok_or(JwtError::TimeoutOutOfRange)?;

        Ok(Self {
            sub: user_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iat_ms: issued_at.timestamp_millis(),
            exp_ms: expires_at.timestamp_millis(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// subject를 사용자 ID로 파싱.
    pub fn subject_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }

    /// 주어진 시각에 만료되었는지 확인 (`now >= exp_ms`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp_ms
    }
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 디코딩 실패")]
    DecodingError,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
    #[error("토큰 유효 시간이 범위를 벗어남")]
    TimeoutOutOfRange,
}

/// Access Token 발급/검증기.
#[derive(Clone)]
pub struct TokenCodec {
    secret: SecretString,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            secret: SecretString::new(secret.into_boxed_str()),
        }
    }

    /// Access Token 발급.
    ///
    /// # Returns
    ///
    /// (인코딩된 JWT 문자열, 페이로드)
    pub fn issue(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<(String, Claims), JwtError> {
        let claims = Claims::new(user.id, user.role, issued_at, timeout)?;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )?;
        Ok((token, claims))
    }

    /// 서명과 형식 검증 후 페이로드 반환.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
            _ => JwtError::DecodingError,
        })
    }
}

/// 불투명한 Refresh Token 값 생성.
pub fn generate_refresh_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn test_user(role: Role) -> User {
        User::new("user@example.com", "hash", role, Utc::now())
    }

    #[test]
    fn test_issue_and_decode() {
        let codec = TokenCodec::new(TEST_SECRET);
        let user = test_user(Role::StandardOperator);
        let issued_at = Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap();

        let (token, claims) = codec.issue(&user, issued_at, Duration::minutes(15)).unwrap();
        assert!(!token.is_empty());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.exp_ms - claims.iat_ms, 15 * 60 * 1000);

        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.subject_id().unwrap(), user.id);
        assert_eq!(decoded.role, Role::StandardOperator);
    }

    #[test]
    fn test_decode_ignores_wall_clock_expiry() {
        // 과거에 발급되어 이미 만료된 토큰도 서명만 맞으면 디코딩됨
        let codec = TokenCodec::new(TEST_SECRET);
        let issued_at = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let (token, claims) = codec
            .issue(&test_user(Role::Administrator), issued_at, Duration::minutes(1))
            .unwrap();

        let decoded = codec.decode(&token).unwrap();
        assert!(decoded.is_expired_at(Utc::now()));
        assert!(!claims.is_expired_at(issued_at));
    }

    #[test]
    fn test_expiry_boundary() {
        let issued_at = Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap();
        let claims = Claims::new(Uuid::new_v4(), Role::StandardOperator, issued_at, Duration::minutes(15))
            .unwrap();

        assert!(!claims.is_expired_at(issued_at + Duration::minutes(15) - Duration::seconds(1)));
        assert!(claims.is_expired_at(issued_at + Duration::minutes(15)));
    }

    #[test]
    fn test_expiry_boundary_keeps_milliseconds() {
        // 정각이 아닌 시각에 발급된 토큰도 정확히 timeout 후에 만료
        let issued_at =
            Utc.with_ymd_and_hms(2023, 6, 16, 12, 0, 0).unwrap() + Duration::milliseconds(900);
        let claims = Claims::new(Uuid::new_v4(), Role::StandardOperator, issued_at, Duration::minutes(15))
            .unwrap();

        let deadline = issued_at + Duration::minutes(15);
        assert!(!claims.is_expired_at(deadline - Duration::milliseconds(500)));
        assert!(!claims.is_expired_at(deadline - Duration::milliseconds(1)));
        assert!(claims.is_expired_at(deadline));
    }

    #[test]
    fn test_out_of_range_timeout_is_rejected() {
        let codec = TokenCodec::new(TEST_SECRET);
        let result = codec.issue(
            &test_user(Role::Administrator),
            Utc::now(),
            Duration::days(365 * 1_000_000),
        );
        assert!(matches!(result, Err(JwtError::TimeoutOutOfRange)));
    }

    #[test]
    fn test_wrong_secret() {
        let (token, _) = TokenCodec::new(TEST_SECRET)
            .issue(&test_user(Role::StandardOperator), Utc::now(), Duration::minutes(15))
            .unwrap();

        let result = TokenCodec::new("wrong-secret-key-for-testing-minimum-32-chars").decode(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        let codec = TokenCodec::new(TEST_SECRET);
        assert!(codec.decode("invalid.token.here").is_err());
        assert!(codec.decode("").is_err());
    }

    #[test]
    fn test_refresh_token_values_are_unique() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), REFRESH_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
