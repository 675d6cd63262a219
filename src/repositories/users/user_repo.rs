//! # 사용자 리포지토리 구현
//!
//! [`UserStore`] 계약의 MongoDB 구현입니다.
//!
//! ## 컬렉션
//!
//! - `users`: 사용자 문서 (`_id`는 순차 정수)
//! - `counters`: `{ _id: "users", seq }` 형태의 ID 시퀀스
//!
//! ## 동시성
//!
//! 실패 횟수 증가는 `$inc` + `ReturnDocument::After`로 처리되어
//! 동시 로그인 실패에서도 증가 후 값이 정확하게 반환됩니다.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, DateTime, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::db::Database;
use crate::domain::entities::users::{NewUser, UpdateUser, User, UserId, UserStatus};
use crate::errors::StoreError;
use crate::repositories::map_mongo_error;

use super::user_store::UserStore;

const USERS_COLLECTION: &str = "users";
const COUNTERS_COLLECTION: &str = "counters";

/// 사용자 데이터 액세스 리포지토리 (MongoDB)
///
/// ## 인덱스
///
/// - `email_unique`: 이메일 유니크 인덱스 (중복 가입 방지)
/// - `created_at_desc`: 최근 가입자 조회용
///
/// ## 사용 예제
///
/// ```rust,ignore
/// let repo = UserRepository::new(&database);
/// repo.create_indexes().await?;
///
/// let user = repo.get_by_email("alice@example.com").await?;
/// let attempts = repo.increment_failed_attempts(user.id).await?;
/// ```
#[derive(Clone)]
pub struct UserRepository {
    users: Collection<User>,
    counters: Collection<Document>,
}

impl UserRepository {
    pub fn new(database: &Database) -> Self {
        let db = database.get_database();
        Self {
            users: db.collection::<User>(USERS_COLLECTION),
            counters: db.collection::<Document>(COUNTERS_COLLECTION),
        }
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 애플리케이션 초기화 시점에 한 번 실행합니다.
    /// 이미 중복 이메일이 있으면 유니크 인덱스 생성이 실패합니다.
    pub async fn create_indexes(&self) -> Result<(), StoreError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        self.users
            .create_indexes([email_index, created_at_index])
            .await
            .map_err(map_mongo_error)?;

        Ok(())
    }

    /// `counters` 컬렉션에서 다음 사용자 ID를 원자적으로 발급합니다.
    async fn next_id(&self) -> Result<UserId, StoreError> {
        let counter = self.counters
            .find_one_and_update(
                doc! { "_id": USERS_COLLECTION },
                doc! { "$inc": { "seq": 1 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .ok_or_else(|| StoreError::Database("ID 시퀀스를 발급하지 못했습니다".to_string()))?;

        match counter.get("seq") {
            Some(Bson::Int32(seq)) => Ok(*seq),
            Some(Bson::Int64(seq)) => UserId::try_from(*seq)
                .map_err(|_| StoreError::Database("ID 시퀀스가 범위를 벗어났습니다".to_string())),
            _ => Err(StoreError::Database("ID 시퀀스 형식이 올바르지 않습니다".to_string())),
        }
    }

    /// 단일 필드 갱신. 대상이 없으면 `NotFound`.
    async fn set_fields(&self, id: UserId, fields: Document) -> Result<(), StoreError> {
        let result = self.users
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let id = self.next_id().await?;
        let now = DateTime::now();

        let user = User {
            id,
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

        self.users
            .insert_one(&user)
            .await
            .map_err(map_mongo_error)?;

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(map_mongo_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: UserId, input: UpdateUser) -> Result<User, StoreError> {
        let mut fields = doc! { "updated_at": DateTime::now() };
        if let Some(full_name) = input.full_name {
            fields.insert("full_name", full_name);
        }
        if let Some(avatar_url) = input.avatar_url {
            fields.insert("avatar_url", avatar_url);
        }
        if let Some(status) = input.status {
            fields.insert("status", status.as_str());
        }
        if let Some(role) = input.role {
            fields.insert("role", role.as_str());
        }

        self.users
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        let now = DateTime::now();
        self.set_fields(id, doc! {
            "password_hash": password_hash,
            "password_changed_at": now,
            "updated_at": now,
        }).await
    }

    async fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError> {
        // 파이프라인 업데이트로 상태 전이를 한 번의 쓰기로 처리
        let pipeline = vec![doc! {
            "$set": {
                "email_verified": true,
                "updated_at": DateTime::now(),
                "status": {
                    "$cond": [
                        { "$eq": ["$status", UserStatus::PendingVerification.as_str()] },
                        UserStatus::Active.as_str(),
                        "$status",
                    ]
                },
            }
        }];

        let result = self.users
            .update_one(doc! { "_id": id }, pipeline)
            .await
            .map_err(map_mongo_error)?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_last_login(&self, id: UserId, ip: Option<&str>) -> Result<(), StoreError> {
        let now = DateTime::now();
        self.set_fields(id, doc! {
            "last_login_at": now,
            "last_login_ip": ip.map(str::to_string),
            "updated_at": now,
        }).await
    }

    async fn increment_failed_attempts(&self, id: UserId) -> Result<i32, StoreError> {
        let user = self.users
            .find_one_and_update(
                doc! { "_id": id },
                doc! {
                    "$inc": { "failed_login_attempts": 1 },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_mongo_error)?
            .ok_or(StoreError::NotFound)?;

        Ok(user.failed_login_attempts)
    }

    async fn reset_failed_attempts(&self, id: UserId) -> Result<(), StoreError> {
        self.set_fields(id, doc! {
            "failed_login_attempts": 0,
            "locked_until": Bson::Null,
            "updated_at": DateTime::now(),
        }).await
    }

    async fn lock_until(&self, id: UserId, until: DateTime) -> Result<(), StoreError> {
        self.set_fields(id, doc! {
            "locked_until": until,
            "updated_at": DateTime::now(),
        }).await
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let result = self.users
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, limit: i64, offset: u64) -> Result<Vec<User>, StoreError> {
        let cursor = self.users
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(offset)
            .limit(limit)
            .await
            .map_err(map_mongo_error)?;

        cursor.try_collect().await.map_err(map_mongo_error)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.users
            .count_documents(doc! {})
            .await
            .map_err(map_mongo_error)
    }
}
