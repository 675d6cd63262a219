//! 관리자용 사용자 관리 요청 DTO

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::users::{UpdateUser, UserRole, UserStatus};

/// 사용자 프로필/상태 수정 요청
///
/// 모든 필드는 선택사항이며, 지정된 필드만 변경됩니다.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "이름은 1-100자여야 합니다"))]
    pub full_name: Option<String>,

    #[validate(url(message = "유효한 URL을 입력해주세요"))]
    pub avatar_url: Option<String>,

    pub status: Option<UserStatus>,

    pub role: Option<UserRole>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            full_name: request.full_name,
            avatar_url: request.avatar_url,
            status: request.status,
            role: request.role,
        }
    }
}

/// 사용자 목록 조회 쿼리 (`?limit=20&offset=0`)
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}
