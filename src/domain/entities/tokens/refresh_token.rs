//! Refresh Token Entity
//!
//! 발급된 리프레시 토큰 하나를 나타냅니다. 원본 토큰 값은 저장하지 않고
//! SHA-256 16진수 해시만 보관합니다.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::UserId;

/// 저장된 리프레시 토큰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: UserId,
    /// 원본 토큰의 SHA-256 해시 (unique)
    pub token_hash: String,
    pub expires_at: DateTime,
    pub revoked: bool,
    #[serde(default)]
    pub revoked_at: Option<DateTime>,
    #[serde(default)]
    pub device_info: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime,
}

/// 요청 출처 메타데이터
///
/// 로그인/갱신 시 리프레시 토큰과 함께 기록되며 사용자 세션 식별에 쓰입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: Option<String>,
}

impl ClientContext {
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
            device_info: None,
        }
    }
}
