//! 에러 타입 모듈
//!
//! - [`errors`] - HTTP 응답으로 변환되는 `AppError`
//! - [`auth_errors`] - 인증 코어와 저장소 계약의 도메인 에러

pub mod errors;
pub mod auth_errors;

pub use errors::*;
pub use auth_errors::*;
