use mongodb::bson::DateTime;
use serde::Serialize;

use crate::domain::entities::users::{User, UserId, UserRole, UserStatus};
use crate::domain::models::token::TokenPair;

/// 사용자 응답 DTO
///
/// 비밀번호 해시, 로그인 실패 횟수, 잠금 정보, 마지막 로그인 IP는 포함하지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            email_verified,
            full_name,
            avatar_url,
            status,
            role,
            last_login_at,
            created_at,
            updated_at,
            ..
        } = user;

        Self {
            id,
            email,
            email_verified,
            full_name,
            avatar_url,
            status,
            role,
            last_login_at,
            created_at,
            updated_at,
        }
    }
}

/// 로그인 응답 DTO (JWT 토큰 포함)
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

impl LoginResponse {
    pub fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            user: UserResponse::from(user),
            tokens,
        }
    }
}

/// 사용자 목록 응답 DTO
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}
