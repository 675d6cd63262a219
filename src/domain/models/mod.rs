//! # Domain Models
//!
//! 영속되지 않는 값 모델입니다.
//!
//! - [`token`] - JWT 클레임과 발급된 토큰 쌍
//! - [`auth`] - 요청 단위 인증 신원, 권한, 미들웨어 모드

pub mod token;
pub mod auth;

pub use token::*;
pub use auth::*;
