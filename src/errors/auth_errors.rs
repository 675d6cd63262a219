//! 인증 코어 도메인 에러
//!
//! 저장소 협력자 계약([`StoreError`]), 비밀번호 정책/해시 에러,
//! 그리고 인증 서비스가 반환하는 안정적인 실패 분류([`AuthError`])를 정의합니다.
//!
//! 호출자는 문자열 비교 없이 `match`로 실패 종류를 분기할 수 있습니다.
//!
//! ```rust,ignore
//! match auth.login(email, password, &client).await {
//!     Ok((tokens, user)) => { /* ... */ }
//!     Err(AuthError::AccountLocked) => { /* 잠금 해제 대기 */ }
//!     Err(e) if e.category() == AuthErrorCategory::Credential => { /* 재인증 */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use thiserror::Error;

/// 사용자/리프레시 토큰 저장소의 실패 계약
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 대상 레코드가 없음
    #[error("record not found")]
    NotFound,

    /// 유니크 제약 위반 (이메일, 토큰 해시 중복)
    #[error("conflict: {0}")]
    Conflict(String),

    /// 저장소 연결/쿼리 실패
    #[error("database error: {0}")]
    Database(String),
}

/// 처음으로 위반된 비밀번호 정책 규칙
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordRule {
    #[error("password must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("password must contain at least one digit")]
    MissingDigit,

    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// 인코딩된 비밀번호 해시 처리 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 형식 오류, 지원하지 않는 알고리즘/버전, 손상된 파라미터
    #[error("malformed password hash: {0}")]
    Decode(String),

    /// 키 유도 자체의 실패 (잘못된 비용 파라미터 등)
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// 에러 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCategory {
    /// 사용자가 입력을 고쳐 해결 (비밀번호 정책 등)
    Policy,
    /// 재인증으로 해결 (잘못된 자격 증명, 무효/만료/재사용 토큰)
    Credential,
    /// 잠금 해제 대기 또는 관리자 조치 필요
    AccountState,
    /// 저장소 장애 등, 현재 요청만 실패
    Infrastructure,
}

/// 인증 서비스 실패 분류
///
/// 모든 변형은 복구 가능한 요청 단위 실패이며 프로세스를 중단시키지 않습니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("password policy violation: {0}")]
    PolicyViolation(PasswordRule),

    #[error("email is already registered")]
    EmailAlreadyRegistered,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is inactive")]
    AccountInactive,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("operation timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn category(&self) -> AuthErrorCategory {
        match self {
            AuthError::PolicyViolation(_) | AuthError::EmailAlreadyRegistered => AuthErrorCategory::Policy,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                AuthErrorCategory::Credential
            }
            AuthError::AccountLocked | AuthError::AccountInactive => AuthErrorCategory::AccountState,
            AuthError::Timeout | AuthError::Internal(_) => AuthErrorCategory::Infrastructure,
        }
    }
}

impl From<PasswordRule> for AuthError {
    fn from(rule: PasswordRule) -> Self {
        AuthError::PolicyViolation(rule)
    }
}

/// 저장소 에러를 그대로 올릴 때는 인프라 에러로 취급합니다.
///
/// `NotFound`가 의미를 가지는 호출 지점(로그인 조회, 토큰 조회)은
/// 이 변환 전에 직접 매칭해야 합니다.
impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
