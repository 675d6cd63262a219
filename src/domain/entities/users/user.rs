//! User Entity Implementation
//!
//! 이메일/비밀번호 기반 로컬 계정의 영속 모델입니다.
//! 계정 상태(`status`)와 로그인 잠금(`locked_until`)은 서로 독립적으로 관리됩니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// 사용자 식별자 (저장소에서 순차 발급)
pub type UserId = i32;

/// 계정 상태
///
/// `pending_verification → active`는 이메일 인증으로만 전이되며,
/// `suspended`/`deleted`는 관리자 조치로 설정됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    PendingVerification,
    Active,
    Suspended,
    Deleted,
}

impl UserStatus {
    /// 비밀번호 로그인이 허용되는 상태인지 확인
    pub fn can_login(&self) -> bool {
        matches!(self, UserStatus::Active | UserStatus::PendingVerification)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::PendingVerification => "pending_verification",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Deleted => "deleted",
        }
    }
}

/// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 사용자 엔티티
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    /// 소문자로 정규화된 이메일 (unique)
    pub email: String,
    /// Argon2id 인코딩 해시
    pub password_hash: String,
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    /// 연속 로그인 실패 횟수
    #[serde(default)]
    pub failed_login_attempts: i32,
    /// 이 시각 이전에는 로그인 불가
    #[serde(default)]
    pub locked_until: Option<DateTime>,
    #[serde(default)]
    pub password_changed_at: Option<DateTime>,
    #[serde(default)]
    pub last_login_at: Option<DateTime>,
    #[serde(default)]
    pub last_login_ip: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// 주어진 시각 기준으로 잠금 상태인지 확인
    pub fn is_locked_at(&self, now: DateTime) -> bool {
        self.locked_until
            .map(|until| until.timestamp_millis() > now.timestamp_millis())
            .unwrap_or(false)
    }
}

/// 사용자 생성 입력
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
}

/// 프로필 부분 수정 입력. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.avatar_url.is_none() && self.status.is_none() && self.role.is_none()
    }
}

/// 저장/조회 전에 이메일을 정규화합니다 (공백 제거, 소문자화).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
