//! 서비스 에러 타입.
//!
//! 인증 엔진, 인가 게이트, 환율 수집 태스크가 공유하는 에러 분류를 정의합니다.
//! 각 에러 종류는 경계 계층에서 서로 다른 HTTP 상태 코드로 변환됩니다.

use thiserror::Error;
use uuid::Uuid;

/// 인증되지 않은 요청의 상세 사유.
///
/// 외부 응답에서는 모두 401로 취급되며, 사유는 로그와 에러 코드에만 사용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// 토큰이 전달되지 않음
    MissingToken,
    /// 인증 헤더 형식 오류
    InvalidAuthHeader,
    /// 서명 검증 실패 또는 형식 오류
    InvalidToken,
    /// 만료된 토큰
    TokenExpired,
    /// 토큰의 subject에 해당하는 사용자가 없음
    UnknownSubject,
}

impl UnauthenticatedReason {
    /// 에러 응답용 코드.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::UnknownSubject => "UNKNOWN_SUBJECT",
        }
    }
}

impl std::fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingToken => "인증 토큰이 필요합니다",
            Self::InvalidAuthHeader => "잘못된 인증 헤더 형식",
            Self::InvalidToken => "유효하지 않은 토큰",
            Self::TokenExpired => "토큰이 만료되었습니다",
            Self::UnknownSubject => "토큰 사용자를 찾을 수 없습니다",
        };
        write!(f, "{}", s)
    }
}

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    /// 유일성 제약 위반
    #[error("중복된 레코드: {0}")]
    Conflict(String),

    /// 저장된 데이터를 도메인 타입으로 변환할 수 없음
    #[error("손상된 레코드: {0}")]
    Corrupt(String),

    /// 백엔드(DB 연결, 잠금 등) 에러
    #[error("저장소 백엔드 에러: {0}")]
    Backend(String),
}

/// 서버 측 실패의 상세 사유.
#[derive(Debug, Error)]
pub enum ServerFailure {
    /// 환율 제공자가 성공이 아닌 상태 코드를 반환
    #[error("환율 제공자 응답 실패: HTTP {0}")]
    ProviderStatus(u16),

    /// 네트워크 전송 실패 또는 타임아웃
    #[error("환율 제공자 호출 실패: {0}")]
    Transport(String),

    /// 응답 본문 파싱 실패
    #[error("환율 응답 파싱 실패: {0}")]
    Payload(String),

    /// 응답에 필요한 통화 키가 없음
    #[error("환율 응답에 {0} 통화가 없습니다")]
    MissingRate(String),

    /// 수집 주체 사용자를 찾을 수 없음
    #[error("수집 주체 사용자를 찾을 수 없습니다: {0}")]
    UnknownActor(Uuid),

    /// 저장소 에러
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 기타 내부 에러 (토큰 인코딩 등)
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 인증/인가/수집 작업의 통합 에러.
///
/// 모든 종류는 해당 작업에 대해 최종적이며, 대체 값으로 복구되지 않습니다.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 이메일이 없거나 비밀번호가 틀림 (두 경우를 구분하지 않음)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    AuthCredentialsInvalid,

    /// 인증되지 않은 요청
    #[error("인증 실패: {0}")]
    Unauthenticated(UnauthenticatedReason),

    /// 인증은 되었으나 권한 부족
    #[error("권한이 부족합니다")]
    Forbidden,

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 서버 측 실패 (5xx)
    #[error("서버 에러: {0}")]
    ServerError(#[from] ServerFailure),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// 인증 실패(401) 계열인지 확인합니다.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            ServiceError::AuthCredentialsInvalid | ServiceError::Unauthenticated(_)
        )
    }

    /// 서버 측 실패(5xx)인지 확인합니다.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServiceError::ServerError(_))
    }

    /// 에러 응답용 코드.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::AuthCredentialsInvalid => "AUTH_CREDENTIALS_INVALID",
            ServiceError::Unauthenticated(reason) => reason.code(),
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::ServerError(_) => "SERVER_ERROR",
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::ServerError(ServerFailure::Storage(err))
    }
}

impl From<UnauthenticatedReason> for ServiceError {
    fn from(reason: UnauthenticatedReason) -> Self {
        ServiceError::Unauthenticated(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(ServiceError::AuthCredentialsInvalid.is_unauthenticated());
        assert!(ServiceError::from(UnauthenticatedReason::TokenExpired).is_unauthenticated());
        assert!(!ServiceError::Forbidden.is_unauthenticated());
        assert!(!ServiceError::Forbidden.is_server_error());

        let storage = ServiceError::from(StorageError::Backend("connection reset".to_string()));
        assert!(storage.is_server_error());
        assert_eq!(storage.code(), "SERVER_ERROR");
    }

    #[test]
    fn test_credentials_message_does_not_leak_case() {
        // 알 수 없는 이메일과 틀린 비밀번호가 같은 메시지를 사용해야 함
        let msg = ServiceError::AuthCredentialsInvalid.to_string();
        assert!(!msg.contains("존재하지"));
        assert_eq!(msg, "이메일 또는 비밀번호가 올바르지 않습니다");
    }

    #[test]
    fn test_unauthenticated_codes() {
        assert_eq!(
            ServiceError::Unauthenticated(UnauthenticatedReason::TokenExpired).code(),
            "TOKEN_EXPIRED"
        );
        assert_eq!(
            ServiceError::Unauthenticated(UnauthenticatedReason::MissingToken).code(),
            "MISSING_TOKEN"
        );
    }

    #[test]
    fn test_provider_status_message() {
        let err = ServiceError::from(ServerFailure::ProviderStatus(418));
        assert!(err.to_string().contains("418"));
    }
}
