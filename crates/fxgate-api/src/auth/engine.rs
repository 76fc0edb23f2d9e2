//! 이메일/비밀번호 인증 엔진.
//!
//! 자격증명을 검증하고 Access Token + Refresh Token 쌍을 발급합니다.
//!
//! # 흐름
//!
//! 1. [`EmailAuthEngine::resolve_credentials`]: 정규화된 이메일로 사용자 조회 (비밀번호 검증 없음)
//! 2. 비밀번호 해시 검증 (사용자가 없으면 더미 검증)
//! 3. Access Token 발급, Refresh Token 생성 및 저장
//!
//! 이메일이 없는 경우와 비밀번호가 틀린 경우는 모두 같은
//! [`ServiceError::AuthCredentialsInvalid`]로 끝납니다.

use std::sync::Arc;

use tracing::{debug, info, warn};

use fxgate_core::{
    normalize_email, Clock, Credentials, RefreshToken, RefreshTokenRepository, ServerFailure,
    ServiceError, ServiceResult, SettingsProvider, User, UserRepository,
};

use super::jwt::{generate_refresh_token, TokenCodec};
use super::password::{burn_verification, verify_password, PasswordError};

/// 인증 성공 결과.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// 이메일 인증 엔진.
pub struct EmailAuthEngine {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    settings: Arc<dyn SettingsProvider>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl EmailAuthEngine {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        settings: Arc<dyn SettingsProvider>,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            settings,
            codec,
            clock,
        }
    }

    /// 자격증명에서 (정규화된 이메일, 비밀번호, 사용자) 추출.
    ///
    /// 조회만 수행하며 비밀번호는 검증하지 않습니다.
    ///
    /// # Errors
    ///
    /// - `ServiceError::InvalidInput`: 이메일 또는 비밀번호가 비어 있음
    pub async fn resolve_credentials(
        &self,
        credentials: &Credentials,
    ) -> ServiceResult<(String, String, Option<User>)> {
        let email = normalize_email(&credentials.email);
        if email.is_empty() {
            return Err(ServiceError::InvalidInput("email은 필수입니다".to_string()));
        }
        if credentials.password.is_empty() {
            return Err(ServiceError::InvalidInput("password는 필수입니다".to_string()));
        }

        let user = self.users.find_by_email(&email).await?;
        Ok((email, credentials.password.clone(), user))
    }

    /// 자격증명 검증 후 토큰 쌍 발급.
    ///
    /// Refresh Token 저장이 실패하면 Access Token도 반환하지 않습니다.
    pub async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<AuthSession> {
        let (_email, password, user) = self.resolve_credentials(credentials).await?;
        let user = verify_credentials(&password, user)?;

        let now = self.clock.now();
        let timeout = self.settings.access_token_timeout().await?;

        let (access_token, claims) = self
            .codec
            .issue(&user, now, timeout)
            .map_err(|e| ServerFailure::Internal(e.to_string()))?;

        let refresh_token = RefreshToken::new(generate_refresh_token(), user.id, now);
        self.refresh_tokens.insert(&refresh_token).await?;

        info!(
            user_id = %user.id,
            role = %user.role,
            expires_at = claims.exp,
            "로그인 성공"
        );

        Ok(AuthSession {
            access_token,
            refresh_token: refresh_token.value,
            user,
        })
    }
}

/// 비밀번호 검증.
///
/// 사용자가 없으면 더미 해시로 검증 비용을 맞춘 뒤 실패합니다.
fn verify_credentials(password: &str, user: Option<User>) -> ServiceResult<User> {
    let Some(user) = user else {
        burn_verification(password);
        debug!("로그인 실패: 자격증명 불일치");
        return Err(ServiceError::AuthCredentialsInvalid);
    };

    match verify_password(password, &user.password_hash) {
        Ok(()) => Ok(user),
        Err(PasswordError::InvalidHashFormat) => {
            warn!(user_id = %user.id, "저장된 비밀번호 해시 형식이 올바르지 않습니다");
            Err(ServiceError::AuthCredentialsInvalid)
        }
        Err(_) => {
            debug!(user_id = %user.id, "로그인 실패: 자격증명 불일치");
            Err(ServiceError::AuthCredentialsInvalid)
        }
    }
}
