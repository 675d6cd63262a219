use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entities::users::{UserId, UserRole};
use crate::errors::AppError;

use super::permission::Permission;

/// 검증된 액세스 토큰에서 도출된 요청 단위 인증 신원
///
/// 요청 수명 동안만 존재하며 저장되지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub email_verified: bool,
    pub role: UserRole,
    /// 역할에서 도출된 권한 목록
    pub permissions: Vec<Permission>,
    /// 액세스 토큰 만료 시각
    pub expires_at: DateTime<Utc>,
    /// 검증된 JWT 클레임 원본
    pub raw: Map<String, Value>,
}

impl Identity {
    /// 특정 권한을 보유하고 있는지 확인
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// 관리자 역할인지 확인
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// 미들웨어가 요청 extensions에 넣어둔 [`Identity`]를 꺼냅니다.
impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Identity>() {
            Some(identity) => ready(Ok(identity.clone())),
            None => ready(Err(AppError::AuthenticationError(
                "인증되지 않은 요청입니다".to_string(),
            ))),
        }
    }
}

/// 선택적 인증 신원 추출자
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();
        ready(Ok(OptionalIdentity(identity)))
    }
}
