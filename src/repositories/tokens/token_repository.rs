//! # 리프레시 토큰 리포지토리 구현
//!
//! [`RefreshTokenStore`] 계약의 MongoDB 구현입니다.
//!
//! ## 회전(rotation) 원자성
//!
//! 폐기는 `{ token_hash, revoked: false }` 조건부 `update_one`으로 수행되므로
//! 같은 토큰으로 동시에 갱신을 요청하면 정확히 한 요청만 `modified_count == 1`을 받습니다.
//! 나머지 요청은 `false`를 받아 재사용으로 처리됩니다.

use async_trait::async_trait;
use chrono::Duration;
use mongodb::{
    bson::{doc, DateTime},
    options::IndexOptions,
    Collection, IndexModel,
};
use uuid::Uuid;

use crate::db::Database;
use crate::domain::entities::tokens::{ClientContext, RefreshToken};
use crate::domain::entities::users::UserId;
use crate::errors::StoreError;
use crate::repositories::map_mongo_error;

use super::refresh_token_store::RefreshTokenStore;

const REFRESH_TOKENS_COLLECTION: &str = "refresh_tokens";

/// 리프레시 토큰 데이터 액세스 리포지토리 (MongoDB)
///
/// ## 인덱스
///
/// - `token_hash_unique`: 해시 조회 및 중복 방지
/// - `user_id_idx`: 사용자별 일괄 폐기
/// - `expires_at_idx`: 만료 토큰 정리
#[derive(Clone)]
pub struct RefreshTokenRepository {
    tokens: Collection<RefreshToken>,
    /// 만료/폐기 후 행을 보존하는 기간
    retention: Duration,
}

impl RefreshTokenRepository {
    pub fn new(database: &Database, retention: Duration) -> Self {
        Self {
            tokens: database.get_database().collection::<RefreshToken>(REFRESH_TOKENS_COLLECTION),
            retention,
        }
    }

    pub async fn create_indexes(&self) -> Result<(), StoreError> {
        let hash_index = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("token_hash_unique".to_string())
                .build())
            .build();

        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder()
                .name("user_id_idx".to_string())
                .build())
            .build();

        let expires_index = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder()
                .name("expires_at_idx".to_string())
                .build())
            .build();

        self.tokens
            .create_indexes([hash_index, user_index, expires_index])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime,
        client: &ClientContext,
    ) -> Result<RefreshToken, StoreError> {
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

        self.tokens
            .insert_one(&token)
            .await
            .map_err(map_mongo_error)?;

        Ok(token)
    }

    async fn get_by_hash(&self, token_hash: &str) -> Result<RefreshToken, StoreError> {
        self.tokens
            .find_one(doc! {
                "token_hash": token_hash,
                "expires_at": { "$gt": DateTime::now() },
            })
            .await
            .map_err(map_mongo_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = self.tokens
            .update_one(
                doc! { "token_hash": token_hash, "revoked": false },
                doc! { "$set": { "revoked": true, "revoked_at": DateTime::now() } },
            )
            .await
            .map_err(map_mongo_error)?;

        Ok(result.modified_count == 1)
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let result = self.tokens
            .update_many(
                doc! { "user_id": user_id, "revoked": false },
                doc! { "$set": { "revoked": true, "revoked_at": DateTime::now() } },
            )
            .await
            .map_err(map_mongo_error)?;

        Ok(result.modified_count)
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let cutoff = DateTime::from_millis(
            DateTime::now().timestamp_millis() - self.retention.num_milliseconds(),
        );

        let result = self.tokens
            .delete_many(doc! {
                "$or": [
                    { "expires_at": { "$lt": cutoff } },
                    { "revoked": true, "revoked_at": { "$lt": cutoff } },
                ]
            })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count)
    }
}
