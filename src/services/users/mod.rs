//! 사용자 관리 서비스 모듈
//!
//! 관리자 API 뒤에서 동작하는 사용자 조회, 수정, 삭제, 이메일 인증 처리와
//! 리프레시 토큰 정리를 제공합니다. 인증 자체는 [`crate::services::auth`]가 담당합니다.

pub mod user_service;

pub use user_service::*;
