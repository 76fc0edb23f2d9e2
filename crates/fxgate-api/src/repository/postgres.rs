//! PostgreSQL 저장소.
//!
//! 스키마 관리는 하지 않으며 다음 테이블이 존재한다고 가정합니다.
//!
//! - `users`
//! - `refresh_tokens`
//! - `exchange_rates_records`
//! - `app_settings` (`setting_key`, `setting_value`)

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use fxgate_core::{
    ExchangeRatesRecord, ExchangeRatesRepository, RefreshToken, RefreshTokenRepository, Role,
    SettingsProvider, StorageError, User, UserRepository,
};

/// Access Token 유효 시간 설정 키.
pub const ACCESS_TOKEN_TIMEOUT_KEY: &str = "access_token_timeout";

const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, \
                            is_email_confirmed, is_confirmed, created_at";

/// sqlx 에러를 저장소 에러로 변환.
fn map_sqlx_error(e: sqlx::Error) -> StorageError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    StorageError::Backend(e.to_string())
}

/// DB에서 조회한 사용자 row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    first_name: String,
    last_name: String,
    is_email_confirmed: bool,
    is_confirmed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            StorageError::Corrupt(format!("사용자 {}의 알 수 없는 역할: {}", row.id, row.role))
        })?;

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            first_name: row.first_name,
            last_name: row.last_name,
            is_email_confirmed: row.is_email_confirmed,
            is_confirmed: row.is_confirmed,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RefreshTokenRow {
    value: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            value: row.value,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExchangeRatesRow {
    id: Uuid,
    actor_id: Uuid,
    rate: Decimal,
    captured_at: DateTime<Utc>,
}

impl From<ExchangeRatesRow> for ExchangeRatesRecord {
    fn from(row: ExchangeRatesRow) -> Self {
        ExchangeRatesRecord {
            id: row.id,
            actor_id: row.actor_id,
            rate: row.rate,
            captured_at: row.captured_at,
        }
    }
}

/// 설정값(분)을 Duration으로 파싱. 표현 가능한 양의 정수만 허용.
fn parse_timeout_minutes(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|m| *m > 0)
        .and_then(Duration::try_minutes)
}

/// PostgreSQL 기반 저장소.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    default_timeout_minutes: i64,
}

impl PgStore {
    /// 새 저장소 생성.
    ///
    /// `default_timeout_minutes`는 `app_settings`에 값이 없거나 잘못된 경우 사용됩니다.
    pub fn new(pool: PgPool, default_timeout_minutes: i64) -> Self {
        Self {
            pool,
            default_timeout_minutes,
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, first_name, last_name,
                               is_email_confirmed, is_confirmed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_email_confirmed)
        .bind(user.is_confirmed)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for PgStore {
    async fn insert(&self, token: &RefreshToken) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO refresh_tokens (value, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(&token.value)
            .bind(token.user_id)
            .bind(token.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, StorageError> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(
            "SELECT value, user_id, created_at FROM refresh_tokens WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(RefreshToken::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, StorageError> {
        let rows: Vec<RefreshTokenRow> = sqlx::query_as(
            r#"
            SELECT value, user_id, created_at
            FROM refresh_tokens
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }
}

#[async_trait]
impl ExchangeRatesRepository for PgStore {
    async fn insert(&self, record: &ExchangeRatesRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO exchange_rates_records (id, actor_id, rate, captured_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(record.actor_id)
        .bind(record.rate)
        .bind(record.captured_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<ExchangeRatesRecord>, StorageError> {
        let rows: Vec<ExchangeRatesRow> = sqlx::query_as(
            r#"
            SELECT id, actor_id, rate, captured_at
            FROM exchange_rates_records
            WHERE actor_id = $1
            ORDER BY captured_at ASC
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ExchangeRatesRecord::from).collect())
    }
}

#[async_trait]
impl SettingsProvider for PgStore {
    async fn access_token_timeout(&self) -> Result<Duration, StorageError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT setting_value FROM app_settings WHERE setting_key = $1 LIMIT 1",
        )
        .bind(ACCESS_TOKEN_TIMEOUT_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let default = Duration::try_minutes(self.default_timeout_minutes).ok_or_else(|| {
            StorageError::Corrupt(format!(
                "기본 access_token_timeout 범위 초과: {}분",
                self.default_timeout_minutes
            ))
        })?;
        match row {
            None => Ok(default),
            Some((value,)) => Ok(parse_timeout_minutes(&value).unwrap_or_else(|| {
                warn!(value = %value, "잘못된 access_token_timeout 설정, 기본값 사용");
                default
            })),
        }
    }
}
