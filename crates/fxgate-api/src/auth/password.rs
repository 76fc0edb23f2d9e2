//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 해싱 및 검증. 저장소에는 PHC 형식 문자열만 보관합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 존재하지 않는 이메일로 로그인할 때 검증에 사용하는 해시.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("fxgate-timing-equalizer").ok());

/// 비밀번호 해싱.
///
/// 솔트는 매 호출마다 새로 생성됩니다.
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 일치하면 Ok(()), 불일치하면 `VerificationFailed`.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 결과를 버리는 더미 검증.
///
/// 알 수 없는 이메일 경로에서도 Argon2 검증 1회의 비용을 치르게 합니다.
pub(crate) fn burn_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// 비밀번호 강도 검증.
///
/// # 요구사항
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("비밀번호에 최소 1개의 숫자가 포함되어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("비밀번호에 최소 1개의 영문자가 포함되어야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("StrongPass777").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("StrongPass777", &hash).is_ok());
        assert!(matches!(
            verify_password("StrongPass778", &hash),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let hash1 = hash_password("AnotherVeryStrongPassword1").unwrap();
        let hash2 = hash_password("AnotherVeryStrongPassword1").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("AnotherVeryStrongPassword1", &hash1).is_ok());
        assert!(verify_password("AnotherVeryStrongPassword1", &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
        // 어떤 입력이든 패닉 없이 끝나야 함
        burn_verification("anything");
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("StrongPass777").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());

        assert!(validate_password_strength("Pass1").is_err());
        assert!(validate_password_strength("Password").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("").is_err());
    }
}
