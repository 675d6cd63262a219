//! 인증 및 보안 서비스 모듈
//!
//! 로컬 계정(이메일/비밀번호) 인증과 RS256 JWT 토큰 관리를 담당합니다.
//!
//! # Features
//!
//! - 비밀번호 정책 검사와 Argon2id 해싱 ([`password_service`])
//! - RSA 서명 키 로딩/생성과 JWKS 공개 ([`jwt_rsa_service`])
//! - 액세스/리프레시 토큰 쌍 발급, 검증, 해시 ([`token_service`])
//! - 로그인 잠금, 리프레시 토큰 회전과 재사용 감지 ([`auth_service`])
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::{AuthProvider, AuthService, RsaKeyPair, TokenService};
//!
//! let keys = RsaKeyPair::load_or_generate(&config.jwt, config.environment)?;
//! let tokens = Arc::new(TokenService::new(keys, &config.jwt));
//! let auth = AuthService::new(user_store, token_store, tokens, &config)?;
//!
//! let (pair, user) = auth.login("a@x.com", "Passw0rd!", &client).await?;
//! ```

pub mod password_service;
pub mod jwt_rsa_service;
pub mod token_service;
pub mod auth_service;

pub use password_service::*;
pub use jwt_rsa_service::*;
pub use token_service::*;
pub use auth_service::*;
