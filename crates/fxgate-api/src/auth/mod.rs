//! 인증 및 인가.
//!
//! - [`EmailAuthEngine`]: 이메일/비밀번호 로그인, 토큰 쌍 발급
//! - [`AuthorizationGate`]: Access Token 검증과 소유자 범위 인가
//! - [`TokenCodec`]: HS256 JWT 발급/검증
//! - 비밀번호 해싱 (Argon2id)
//! - Axum 추출기 ([`AccessToken`], [`CurrentUser`])

mod engine;
mod gate;
mod jwt;
mod middleware;
mod password;

pub use engine::{AuthSession, EmailAuthEngine};
pub use gate::{check_access, AuthorizationGate};
pub use jwt::{generate_refresh_token, Claims, JwtError, TokenCodec};
pub use middleware::{extract_token, AccessToken, CurrentUser, AUTH_TOKEN_HEADER};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
