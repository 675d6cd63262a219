//! 인메모리 사용자 저장소
//!
//! 단일 프로세스 로컬 실행과 테스트용입니다. 락은 각 메서드 안에서만 잡고
//! `.await` 지점을 넘기지 않습니다.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::DateTime;

use crate::domain::entities::users::{NewUser, UpdateUser, User, UserId, UserStatus};
use crate::errors::StoreError;

use super::user_store::UserStore;

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    next_id: UserId,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Database("user store lock poisoned".to_string()))
    }

    /// 대상 사용자에 변경을 적용하고 `updated_at`을 갱신합니다.
    fn modify<R>(&self, id: UserId, apply: impl FnOnce(&mut User) -> R) -> Result<R, StoreError> {
        let mut inner = self.lock()?;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        let result = apply(&mut *user);
        user.updated_at = DateTime::now();
        Ok(result)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        if inner.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict(format!("duplicate email: {}", input.email)));
        }

        inner.next_id += 1;
        let now = DateTime::now();
        let user = User {
            id: inner.next_id,
            email: input.email,
            password_hash: input.password_hash,
            email_verified: false,
            full_name: input.full_name,
            avatar_url: None,
            status: UserStatus::PendingVerification,
            role: input.role,
            failed_login_attempts: 0,
            locked_until: None,
            password_changed_at: None,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.lock()?.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: UserId, input: UpdateUser) -> Result<User, StoreError> {
        self.modify(id, |user| {
            if let Some(full_name) = input.full_name {
                user.full_name = Some(full_name);
            }
            if let Some(avatar_url) = input.avatar_url {
                user.avatar_url = Some(avatar_url);
            }
            if let Some(status) = input.status {
                user.status = status;
            }
            if let Some(role) = input.role {
                user.role = role;
            }
        })?;
        self.get_by_id(id).await
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        self.modify(id, |user| {
            user.password_hash = password_hash.to_string();
            user.password_changed_at = Some(DateTime::now());
        })
    }

    async fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError> {
        self.modify(id, |user| {
            user.email_verified = true;
            if user.status == UserStatus::PendingVerification {
                user.status = UserStatus::Active;
            }
        })
    }

    async fn update_last_login(&self, id: UserId, ip: Option<&str>) -> Result<(), StoreError> {
        self.modify(id, |user| {
            user.last_login_at = Some(DateTime::now());
            user.last_login_ip = ip.map(str::to_string);
        })
    }

    async fn increment_failed_attempts(&self, id: UserId) -> Result<i32, StoreError> {
        self.modify(id, |user| {
            user.failed_login_attempts += 1;
            user.failed_login_attempts
        })
    }

    async fn reset_failed_attempts(&self, id: UserId) -> Result<(), StoreError> {
        self.modify(id, |user| {
            user.failed_login_attempts = 0;
            user.locked_until = None;
        })
    }

    async fn lock_until(&self, id: UserId, until: DateTime) -> Result<(), StoreError> {
        self.modify(id, |user| user.locked_until = Some(until))
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.lock()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, limit: i64, offset: u64) -> Result<Vec<User>, StoreError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);

        Ok(self.lock()?
            .users
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.users.len() as u64)
    }
}
