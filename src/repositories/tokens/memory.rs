//! 인메모리 리프레시 토큰 저장소
//!
//! 해시를 키로 하는 맵 하나를 뮤텍스로 보호합니다. 조건 확인과 폐기가
//! 같은 임계 구역에서 일어나므로 `revoke`는 MongoDB 구현과 같은 원자성을 가집니다.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Duration;
use mongodb::bson::DateTime;
use uuid::Uuid;

use crate::domain::entities::tokens::{ClientContext, RefreshToken};
use crate::domain::entities::users::UserId;
use crate::errors::StoreError;

use super::refresh_token_store::RefreshTokenStore;

pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
    retention: Duration,
}

impl InMemoryRefreshTokenStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            retention,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, RefreshToken>>, StoreError> {
        self.tokens
            .lock()
            .map_err(|_| StoreError::Database("refresh token store lock poisoned".to_string()))
    }
}

impl Default for InMemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime,
        client: &ClientContext,
    ) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.lock()?;
        if tokens.contains_key(token_hash) {
            return Err(StoreError::Conflict("duplicate token hash".to_string()));
        }

        let token = RefreshToken {
            id: Uuid::new_v4().to_string(),
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked: false,
            revoked_at: None,
            device_info: client.device_info.clone(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            created_at: DateTime::now(),
        };
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn get_by_hash(&self, token_hash: &str) -> Result<RefreshToken, StoreError> {
        let now = DateTime::now().timestamp_millis();
        self.lock()?
            .get(token_hash)
            .filter(|t| t.expires_at.timestamp_millis() > now)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut tokens = self.lock()?;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                token.revoked_at = Some(DateTime::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let now = DateTime::now();
        let mut revoked = 0;
        for token in self.lock()?.values_mut().filter(|t| t.user_id == user_id && !t.revoked) {
            token.revoked = true;
            token.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let cutoff = DateTime::now().timestamp_millis() - self.retention.num_milliseconds();
        let mut tokens = self.lock()?;
        let before = tokens.len();

        tokens.retain(|_, t| {
            let expired = t.expires_at.timestamp_millis() < cutoff;
            let revoked_long_ago = t.revoked_at.map(|at| at.timestamp_millis() < cutoff).unwrap_or(false);
            !(expired || revoked_long_ago)
        });

        Ok((before - tokens.len()) as u64)
    }
}
