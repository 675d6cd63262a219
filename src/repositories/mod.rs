//! # Repositories
//!
//! 인증 코어가 소비하는 저장소 협력자 계약과 그 구현체입니다.
//!
//! | 계약 | MongoDB | 인메모리 |
//! |------|---------|----------|
//! | [`UserStore`] | [`UserRepository`] | [`InMemoryUserStore`] |
//! | [`RefreshTokenStore`] | [`RefreshTokenRepository`] | [`InMemoryRefreshTokenStore`] |
//!
//! 인메모리 구현은 테스트와 `AUTH_STORAGE=memory` 로컬 실행용입니다.

use mongodb::error::{ErrorKind, WriteFailure};

use crate::errors::StoreError;

pub mod users;
pub mod tokens;

pub use users::*;
pub use tokens::*;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB 에러를 저장소 계약 에러로 변환합니다. 유니크 인덱스 위반은 `Conflict`가 됩니다.
pub(crate) fn map_mongo_error(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
            StoreError::Conflict(write_error.message.clone())
        }
        _ => StoreError::Database(err.to_string()),
    }
}
