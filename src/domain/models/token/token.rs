//! JWT 인증 토큰 구조체 및 페어링 된 세트
//!
//! RFC 7519 표준 클레임과 애플리케이션 클레임, 그리고 용도별 토큰 2개를
//! 묶은 응답 모델을 정의합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{UserId, UserRole};

/// 토큰 용도 구분자
///
/// 액세스 토큰이 리프레시 토큰 자리에 (또는 그 반대로) 쓰이는 것을 막기 위해
/// 모든 토큰에 포함되며 검증 시 반드시 비교됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT 토큰의 클레임(Payload) 구조체
///
/// ## 클레임 구성
///
/// - `iss` / `aud`: 발급자와 대상 (검증 시 설정값과 비교)
/// - `sub`: 토큰의 주체 (사용자 ID 문자열)
/// - `iat` / `exp`: 발급/만료 시간 (Unix timestamp, 초)
/// - `jti`: 토큰마다 고유한 ID (UUID v4)
/// - `user_id`, `email`, `email_verified`, `role`: 애플리케이션 클레임
/// - `token_type`: `access` 또는 `refresh`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub user_id: UserId,
    pub email: String,
    pub email_verified: bool,
    pub role: UserRole,
    pub token_type: TokenType,
}

/// JWT 토큰 쌍 구조체
///
/// OAuth 2.0 토큰 응답 형식을 따릅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// 액세스 토큰 (API 접근용 단기 토큰)
    pub access_token: String,
    /// 리프레시 토큰 (토큰 갱신용 장기 토큰, 1회용)
    pub refresh_token: String,
    /// 항상 `Bearer`
    pub token_type: String,
    /// 액세스 토큰 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 액세스 토큰 만료 시각
    pub expires_at: DateTime<Utc>,
    /// 리프레시 토큰 만료 시각
    pub refresh_expires_at: DateTime<Utc>,
}
