//! 인메모리 저장소.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::{ExchangeRatesRepository, RefreshTokenRepository, SettingsProvider, UserRepository};
use crate::domain::{normalize_email, ExchangeRatesRecord, RefreshToken, User};
use crate::error::StorageError;

/// 프로세스 내 저장소.
///
/// 모든 trait을 구현하므로 하나의 `Arc<MemoryStore>`를 각 컴포넌트에 나눠 줄 수 있습니다.
/// 잠금은 동기식이며 메서드 반환 전에 해제됩니다.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    refresh_tokens: RwLock<Vec<RefreshToken>>,
    exchange_rates: RwLock<Vec<ExchangeRatesRecord>>,
    access_token_timeout_minutes: AtomicI64,
}

impl MemoryStore {
    /// Access Token 유효 시간(분)을 지정해 생성.
    pub fn new(access_token_timeout_minutes: i64) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(Vec::new()),
            exchange_rates: RwLock::new(Vec::new()),
            access_token_timeout_minutes: AtomicI64::new(access_token_timeout_minutes),
        }
    }

    /// Access Token 유효 시간(분) 변경.
    pub fn set_access_token_timeout_minutes(&self, minutes: i64) {
        self.access_token_timeout_minutes
            .store(minutes, Ordering::SeqCst);
    }

    /// 저장된 전체 Refresh Token 수.
    pub fn refresh_token_count(&self) -> usize {
        read(&self.refresh_tokens).map(|t| t.len()).unwrap_or(0)
    }

    /// 저장된 전체 환율 기록 수.
    pub fn exchange_rate_count(&self) -> usize {
        read(&self.exchange_rates).map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(15)
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StorageError> {
    lock.read()
        .map_err(|_| StorageError::Backend("메모리 저장소 잠금 오염".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StorageError> {
    lock.write()
        .map_err(|_| StorageError::Backend("메모리 저장소 잠금 오염".to_string()))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let email = normalize_email(email);
        let users = read(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StorageError> {
        let mut users = write(&self.users)?;
        let email = normalize_email(&user.email);
        if users.values().any(|u| u.email == email) {
            return Err(StorageError::Conflict(format!("email {}", email)));
        }
        if users.contains_key(&user.id) {
            return Err(StorageError::Conflict(format!("user id {}", user.id)));
        }

        let mut user = user.clone();
        user.email = email;
        users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn insert(&self, token: &RefreshToken) -> Result<(), StorageError> {
        let mut tokens = write(&self.refresh_tokens)?;
        if tokens.iter().any(|t| t.value == token.value) {
            return Err(StorageError::Conflict("refresh token value".to_string()));
        }
        tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, StorageError> {
        let tokens = read(&self.refresh_tokens)?;
        Ok(tokens.iter().find(|t| t.value == value).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, StorageError> {
        let tokens = read(&self.refresh_tokens)?;
        Ok(tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ExchangeRatesRepository for MemoryStore {
    async fn insert(&self, record: &ExchangeRatesRecord) -> Result<(), StorageError> {
        write(&self.exchange_rates)?.push(record.clone());
        Ok(())
    }

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
    ) -> Result<Vec<ExchangeRatesRecord>, StorageError> {
        let records = read(&self.exchange_rates)?;
        Ok(records
            .iter()
            .filter(|r| r.actor_id == actor_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettingsProvider for MemoryStore {
    async fn access_token_timeout(&self) -> Result<Duration, StorageError> {
        let minutes = self.access_token_timeout_minutes.load(Ordering::SeqCst);
        Duration::try_minutes(minutes).ok_or_else(|| {
            StorageError::Corrupt(format!("access_token_timeout 범위 초과: {}분", minutes))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_user_lookup_is_case_insensitive() {
        let store = MemoryStore::default();
        let user = User::new("Operator@Example.com", "hash", Role::StandardOperator, Utc::now());
        store.create(&user).await.unwrap();

        let found = store.find_by_email("OPERATOR@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(store.find_by_email("other@example.com").await.unwrap().is_none());
        assert!(store.find_by_id(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let store = MemoryStore::default();
        let first = User::new("dup@example.com", "hash", Role::StandardOperator, Utc::now());
        let second = User::new("DUP@example.com", "hash", Role::Administrator, Utc::now());

        store.create(&first).await.unwrap();
        let result = store.create(&second).await;
        assert!(matches!(result, Err(StorageError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_refresh_tokens_accumulate_per_user() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();

        RefreshTokenRepository::insert(&store, &RefreshToken::new("a", user_id, Utc::now()))
            .await
            .unwrap();
        RefreshTokenRepository::insert(&store, &RefreshToken::new("b", user_id, Utc::now()))
            .await
            .unwrap();

        // 같은 값은 거부
        let dup = RefreshTokenRepository::insert(&store, &RefreshToken::new("a", user_id, Utc::now())).await;
        assert!(matches!(dup, Err(StorageError::Conflict(_))));

        assert_eq!(store.list_for_user(user_id).await.unwrap().len(), 2);
        assert_eq!(store.refresh_token_count(), 2);
        assert!(store.find_by_value("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_exchange_rate_records() {
        let store = MemoryStore::default();
        let actor = Uuid::new_v4();
        let record = ExchangeRatesRecord::new(actor, dec!(0.011910277), Utc::now());

        ExchangeRatesRepository::insert(&store, &record).await.unwrap();

        let records = store.list_for_actor(actor).await.unwrap();
        assert_eq!(records, vec![record]);
        assert!(store.list_for_actor(Uuid::new_v4()).await.unwrap().is_empty());
        assert_eq!(store.exchange_rate_count(), 1);
    }

    #[tokio::test]
    async fn test_access_token_timeout_setting() {
        let store = MemoryStore::new(30);
        assert_eq!(store.access_token_timeout().await.unwrap(), Duration::minutes(30));

        store.set_access_token_timeout_minutes(5);
        assert_eq!(store.access_token_timeout().await.unwrap(), Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_out_of_range_timeout_is_error() {
        let store = MemoryStore::new(15);
        store.set_access_token_timeout_minutes(i64::MAX);
        assert!(matches!(
            store.access_token_timeout().await,
            Err(StorageError::Corrupt(_))
        ));
    }
}
