//! # Data Transfer Objects
//!
//! HTTP 요청/응답 본문 구조체입니다. 요청 DTO는 `validator`로 형식을 검증하고,
//! 비밀번호 강도 같은 도메인 규칙은 서비스 계층에서 검사합니다.

pub mod users;
pub mod tokens;

pub use users::*;
pub use tokens::*;
