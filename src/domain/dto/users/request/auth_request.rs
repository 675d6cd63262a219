//! 인증 요청관련 DTO
//!
//! 형식 검증만 수행합니다. 비밀번호 강도 정책은 서비스 계층의
//! `PasswordPolicy`가 설정값에 따라 검사합니다.

use serde::Deserialize;
use validator::Validate;

/// 회원가입 요청 구조체
///
/// ```json
/// { "email": "a@x.com", "password": "Passw0rd!", "full_name": "Ann" }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "비밀번호는 1-128자여야 합니다"))]
    pub password: String,

    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    pub full_name: Option<String>,
}

/// 로컬 로그인 요청 구조체
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 비밀번호 변경 요청 구조체
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "현재 비밀번호를 입력해주세요"))]
    pub current_password: String,

    #[validate(length(min = 1, max = 128, message = "새 비밀번호는 1-128자여야 합니다"))]
    pub new_password: String,
}
