//! # 사용자 관리 서비스 구현
//!
//! 관리자용 사용자 조회/수정/삭제와 이메일 인증 처리, 만료 토큰 정리를 담당합니다.
//! 모든 메서드는 `AppResult<T>`를 반환하며 핸들러에서 그대로 응답으로 변환됩니다.
//!
//! ## 상태 전이 규칙
//!
//! ```text
//! pending_verification ──(verify_email)──▶ active ──▶ suspended ◀──▶ active
//!          │                                  │
//!          └──────────────▶ deleted ◀─────────┘
//! ```
//!
//! - `pending_verification → active`는 [`UserService::verify_email`]로만 가능합니다.
//! - `deleted` 계정은 다른 상태로 되돌릴 수 없습니다.
//! - `suspended`/`deleted`로 바뀌면 해당 사용자의 리프레시 토큰을 모두 폐기합니다.

use std::sync::Arc;

use crate::domain::dto::users::response::{UserListResponse, UserResponse};
use crate::domain::entities::users::{UpdateUser, UserId, UserStatus};
use crate::errors::{AppError, AppResult, StoreError};
use crate::repositories::tokens::RefreshTokenStore;
use crate::repositories::users::UserStore;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// 사용자 관리 비즈니스 로직 서비스
///
/// 저장소는 생성 시 명시적으로 전달받습니다.
///
/// ```rust,ignore
/// let user_service = UserService::new(user_store.clone(), token_store.clone());
/// let page = user_service.list_users(Some(50), None).await?;
/// ```
pub struct UserService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self { users, refresh_tokens }
    }

    /// 사용자 목록 조회
    ///
    /// `limit`은 1..=100으로 보정되며 기본값은 20입니다.
    pub async fn list_users(&self, limit: Option<i64>, offset: Option<u64>) -> AppResult<UserListResponse> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0);

        let users = self.users.list(limit, offset).await?;
        let total = self.count_users().await?;

        Ok(UserListResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
            total,
            limit,
            offset,
        })
    }

    pub async fn count_users(&self) -> AppResult<u64> {
        Ok(self.users.count().await?)
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<UserResponse> {
        let user = self.users.get_by_id(id).await.map_err(|e| not_found_or(e, id))?;
        Ok(UserResponse::from(user))
    }

    /// 프로필, 상태, 역할 수정
    ///
    /// # Errors
    ///
    /// * `ValidationError` - 변경할 필드가 없거나 허용되지 않는 상태 전이
    /// * `ConflictError` - 삭제된 계정 복구 시도
    /// * `NotFound` - 사용자 없음
    pub async fn update_user(&self, id: UserId, update: UpdateUser) -> AppResult<UserResponse> {
        if update.is_empty() {
            return Err(AppError::ValidationError("변경할 필드가 없습니다".to_string()));
        }

        let current = self.users.get_by_id(id).await.map_err(|e| not_found_or(e, id))?;

        if let Some(next) = update.status {
            check_status_transition(current.status, next)?;
        }

        let updated = self.users.update(id, update).await.map_err(|e| not_found_or(e, id))?;

        if current.status != updated.status && !updated.status.can_login() {
            let revoked = self.refresh_tokens.revoke_all_for_user(id).await?;
            log::warn!(
                "계정 상태 변경 {} → {} - user_id: {}, 폐기된 세션: {}개",
                current.status.as_str(),
                updated.status.as_str(),
                id,
                revoked
            );
        }

        log::info!("사용자 정보 수정 - user_id: {}", id);
        Ok(UserResponse::from(updated))
    }

    /// 이메일 인증 완료 처리 (`pending_verification`이면 `active`로 전이)
    pub async fn verify_email(&self, id: UserId) -> AppResult<UserResponse> {
        self.users.mark_email_verified(id).await.map_err(|e| not_found_or(e, id))?;
        log::info!("📧 이메일 인증 완료 - user_id: {}", id);
        self.get_user(id).await
    }

    /// 사용자 삭제. 삭제 전에 모든 리프레시 토큰을 폐기합니다.
    pub async fn delete_user(&self, id: UserId) -> AppResult<()> {
        self.users.get_by_id(id).await.map_err(|e| not_found_or(e, id))?;

        let revoked = self.refresh_tokens.revoke_all_for_user(id).await?;
        self.users.delete(id).await.map_err(|e| not_found_or(e, id))?;

        log::warn!("🗑️ 사용자 삭제 - user_id: {}, 폐기된 세션: {}개", id, revoked);
        Ok(())
    }

    /// 보존 기간이 지난 만료/폐기 리프레시 토큰 정리
    pub async fn purge_expired_tokens(&self) -> AppResult<u64> {
        let deleted = self.refresh_tokens.delete_expired().await?;
        log::info!("🧹 만료된 리프레시 토큰 {}개 정리", deleted);
        Ok(deleted)
    }
}

fn not_found_or(err: StoreError, id: UserId) -> AppError {
    match err {
        StoreError::NotFound => {
            AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", id))
        }
        other => AppError::from(other),
    }
}

fn check_status_transition(current: UserStatus, next: UserStatus) -> AppResult<()> {
    match (current, next) {
        (a, b) if a == b => Ok(()),
        (UserStatus::Deleted, _) => {
            Err(AppError::ConflictError("삭제된 계정은 복구할 수 없습니다".to_string()))
        }
        (UserStatus::PendingVerification, UserStatus::Active) => Err(AppError::ValidationError(
            "이메일 인증 전에는 계정을 활성화할 수 없습니다".to_string(),
        )),
        (_, UserStatus::PendingVerification) => Err(AppError::ValidationError(
            "인증 대기 상태로 되돌릴 수 없습니다".to_string(),
        )),
        _ => Ok(()),
    }
}
