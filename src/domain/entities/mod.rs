//! # Domain Entities
//!
//! 저장소에 영속되는 도메인 엔티티입니다.
//!
//! - [`users`] - 사용자 계정, 상태, 역할
//! - [`tokens`] - 해시로만 저장되는 리프레시 토큰

pub mod users;
pub mod tokens;

pub use users::*;
pub use tokens::*;
