//! 애플리케이션 전역에서 사용하는 HTTP 에러 시스템
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 타입 안전하고
//! 일관된 에러 응답을 제공합니다. 인증 도메인 에러([`AuthError`])는
//! `From` 변환을 통해 사용자에게 노출해도 안전한 메시지로 축약됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! async fn login(payload: web::Json<LoginRequest>) -> Result<HttpResponse, AppError> {
//!     payload.validate()
//!         .map_err(|e| AppError::ValidationError(e.to_string()))?;
//!
//!     // AuthError -> AppError 자동 변환
//!     let (tokens, user) = auth.login(&payload.email, &payload.password, &client).await?;
//!     Ok(HttpResponse::Ok().json(tokens))
//! }
//! ```

use thiserror::Error;

use super::auth_errors::{AuthError, StoreError};

/// 애플리케이션 전역 에러 타입
///
/// 자동으로 HTTP 응답으로 변환되어 클라이언트에게 전달됩니다.
/// 500 계열 에러의 상세 내용은 로그에만 남고 응답 본문에는 포함되지 않습니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러 (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 토큰 만료 (401 Unauthorized, 클라이언트는 갱신 시도)
    #[error("Token expired")]
    TokenExpired,

    /// 권한 부족 에러 (403 Forbidden)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 잠금/비활성 계정 (403 Forbidden, 사유는 구분하지 않음)
    #[error("Account unavailable")]
    AccountUnavailable,

    /// 처리 시간 초과 (503 Service Unavailable)
    #[error("Request timed out")]
    Timeout,

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 응답 본문의 `error` 코드
    fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => "internal_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::ConflictError(_) => "conflict",
            AppError::AuthenticationError(_) => "authentication_failed",
            AppError::TokenExpired => "token_expired",
            AppError::AuthorizationError(_) => "insufficient_permissions",
            AppError::AccountUnavailable => "account_unavailable",
            AppError::Timeout => "timeout",
        }
    }

    /// 클라이언트에게 보여줄 메시지. 내부 상세는 제외합니다.
    fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                "요청을 처리하는 중 오류가 발생했습니다".to_string()
            }
            AppError::Timeout => "요청 처리 시간이 초과되었습니다".to_string(),
            other => other.to_string(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) | AppError::AccountUnavailable => StatusCode::FORBIDDEN,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        if matches!(self, AppError::DatabaseError(_) | AppError::InternalError(_)) {
            log::error!("요청 처리 실패: {}", self);
        }

        actix_web::HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.public_message(),
        }))
    }
}

impl From<AuthError> for AppError {
    /// 자격 증명/계정 상태 에러는 열거 공격에 쓰일 수 없는 일반 메시지로 바뀝니다.
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PolicyViolation(rule) => AppError::ValidationError(rule.to_string()),
            AuthError::EmailAlreadyRegistered => {
                AppError::ConflictError("이미 사용 중인 이메일입니다".to_string())
            }
            AuthError::InvalidCredentials => {
                AppError::AuthenticationError("invalid credentials".to_string())
            }
            AuthError::InvalidToken => AppError::AuthenticationError("invalid token".to_string()),
            AuthError::TokenExpired => AppError::TokenExpired,
            AuthError::AccountLocked | AuthError::AccountInactive => AppError::AccountUnavailable,
            AuthError::Timeout => AppError::Timeout,
            AuthError::Internal(detail) => AppError::InternalError(detail),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("요청한 리소스를 찾을 수 없습니다".to_string()),
            StoreError::Conflict(detail) => AppError::ConflictError(detail),
            StoreError::Database(detail) => AppError::DatabaseError(detail),
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;
