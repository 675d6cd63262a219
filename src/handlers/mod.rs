//! # HTTP Request Handlers Module
//!
//! 인증 코어의 HTTP 엔드포인트입니다. 핸들러는 요청 검증과 응답 변환만 담당하고,
//! 비즈니스 규칙은 [`AuthProvider`](crate::services::auth::AuthProvider)와
//! [`UserService`](crate::services::users::UserService)에 위임합니다.
//!
//! ```text
//! Client ──▶ Middleware (Bearer 검증) ──▶ Handlers (이 모듈) ──▶ Services ──▶ Stores
//! ```
//!
//! 서비스는 `web::Data`로 주입되며, 보호된 핸들러는 [`Identity`](crate::domain::models::auth::Identity)
//! 추출자로 인증된 사용자 정보를 받습니다.
//!
//! - [`auth`] - 가입, 로그인, 내 정보, 비밀번호 변경
//! - [`token_handlers`] - 토큰 갱신, 로그아웃
//! - [`users`] - 관리자용 사용자 관리
//! - [`rsa`] - JWKS 공개키

pub mod auth;
pub mod rsa;
pub mod token_handlers;
pub mod users;

pub use auth::*;
pub use rsa::*;
pub use token_handlers::*;
pub use users::*;
