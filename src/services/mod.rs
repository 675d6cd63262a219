//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 `main`에서 저장소와 설정을 받아 한 번 생성되고,
//! `web::Data`와 미들웨어 생성자를 통해 라우팅 계층에 전달됩니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::{auth::AuthService, users::UserService};
//!
//! let auth = Arc::new(AuthService::new(users.clone(), tokens.clone(), token_service, &config)?);
//! let user_service = Arc::new(UserService::new(users, tokens));
//! ```

pub mod users;
pub mod auth;
