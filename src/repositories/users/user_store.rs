use async_trait::async_trait;
use mongodb::bson::DateTime;

use crate::domain::entities::users::{NewUser, UpdateUser, User, UserId};
use crate::errors::StoreError;

/// 사용자 레코드 저장소 계약
///
/// 조회/수정 대상이 없으면 반드시 [`StoreError::NotFound`]를 반환해야 합니다.
/// 이메일은 호출자가 정규화해서 전달합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 새 사용자를 생성합니다. 이메일 중복이면 `Conflict`.
    async fn create(&self, input: NewUser) -> Result<User, StoreError>;

    async fn get_by_id(&self, id: UserId) -> Result<User, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// 프로필 필드를 부분 수정하고 수정된 사용자를 반환합니다.
    async fn update(&self, id: UserId, input: UpdateUser) -> Result<User, StoreError>;

    /// 비밀번호 해시와 `password_changed_at`을 갱신합니다.
    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError>;

    /// 이메일 인증 완료 처리. `pending_verification` 상태는 `active`로 전이됩니다.
    async fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError>;

    async fn update_last_login(&self, id: UserId, ip: Option<&str>) -> Result<(), StoreError>;

    /// 실패 횟수를 원자적으로 1 증가시키고 증가 후 값을 반환합니다.
    async fn increment_failed_attempts(&self, id: UserId) -> Result<i32, StoreError>;

    /// 실패 횟수를 0으로 되돌리고 잠금을 해제합니다.
    async fn reset_failed_attempts(&self, id: UserId) -> Result<(), StoreError>;

    async fn lock_until(&self, id: UserId, until: DateTime) -> Result<(), StoreError>;

    async fn delete(&self, id: UserId) -> Result<(), StoreError>;

    /// ID 오름차순으로 `offset`부터 최대 `limit`명을 반환합니다.
    async fn list(&self, limit: i64, offset: u64) -> Result<Vec<User>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
