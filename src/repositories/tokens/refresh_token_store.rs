use async_trait::async_trait;
use mongodb::bson::DateTime;

use crate::domain::entities::tokens::{ClientContext, RefreshToken};
use crate::domain::entities::users::UserId;
use crate::errors::StoreError;

/// 해시된 리프레시 토큰 저장소 계약
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 토큰 해시를 저장합니다. 같은 해시가 이미 있으면 `Conflict`.
    async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime,
        client: &ClientContext,
    ) -> Result<RefreshToken, StoreError>;

    /// 만료되지 않은 토큰만 반환합니다. 폐기된 토큰도 재사용 감지를 위해 반환됩니다.
    async fn get_by_hash(&self, token_hash: &str) -> Result<RefreshToken, StoreError>;

    /// `revoked = false`인 토큰을 원자적으로 폐기합니다.
    ///
    /// 이번 호출이 폐기에 성공했으면 `true`, 이미 폐기되었거나 없으면 `false`.
    /// 동시에 같은 토큰을 폐기하면 정확히 한 호출만 `true`를 받습니다.
    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// 사용자의 모든 활성 토큰을 폐기하고 폐기된 개수를 반환합니다.
    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// 보존 기간이 지난 만료/폐기 토큰을 삭제하고 삭제된 개수를 반환합니다.
    async fn delete_expired(&self) -> Result<u64, StoreError>;
}
