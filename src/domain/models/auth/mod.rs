//! 요청 단위 인증 모델

pub mod identity;
pub mod permission;
pub mod auth_mode;

pub use identity::*;
pub use permission::*;
pub use auth_mode::*;
