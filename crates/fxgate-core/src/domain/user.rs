//! 사용자, 역할, 권한 모델.
//!
//! 관리자와 일반 운영자는 하나의 [`User`] 레코드에 [`Role`] 태그로 구분되며,
//! 각 역할이 가지는 [`Capability`] 집합으로 인가 판단을 내립니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 관리자 - 다른 사용자의 리소스 조회 가능
    Administrator,
    /// 일반 운영자 - 본인 리소스만 접근
    StandardOperator,
}

/// 역할이 가지는 개별 권한.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// 본인 리소스 조회
    ReadOwn,
    /// 모든 사용자 리소스 조회
    ReadAny,
    /// 본인 리소스 수정
    WriteOwn,
}

const BASE_CAPABILITIES: &[Capability] = &[Capability::ReadOwn, Capability::WriteOwn];
const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ReadOwn,
    Capability::WriteOwn,
    Capability::ReadAny,
];

impl Role {
    /// 역할의 권한 집합.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Administrator => ADMIN_CAPABILITIES,
            Role::StandardOperator => BASE_CAPABILITIES,
        }
    }

    /// 특정 권한 보유 여부.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "admin" | "super_admin" => Some(Role::Administrator),
            "standard_operator" | "operator" => Some(Role::StandardOperator),
            _ => None,
        }
    }

    /// 저장용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::StandardOperator => "standard_operator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 이메일 정규화 (앞뒤 공백 제거, 소문자화).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 저장된 사용자 레코드.
///
/// `password_hash`는 PHC 형식의 Argon2 해시이며 직렬화되지 않습니다.
/// 외부 응답에는 [`PublicUser`]를 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub is_email_confirmed: bool,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 새 사용자 레코드 생성 (이메일은 정규화됨).
    pub fn new(
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            first_name: String::new(),
            last_name: String::new(),
            is_email_confirmed: true,
            is_confirmed: true,
            created_at,
        }
    }

    /// 이름 설정.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// 특정 권한 보유 여부.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.role.has_capability(capability)
    }

    /// 외부 응답용 투영.
    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// 외부 응답용 사용자 정보 (비밀번호 해시 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: Role,
    pub is_email_confirmed: bool,
    pub is_confirmed: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.role,
            is_email_confirmed: user.is_email_confirmed,
            is_confirmed: user.is_confirmed,
        }
    }
}

/// 이메일 로그인 자격증명.
///
/// `Debug` 출력에서 비밀번호는 가려집니다.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
