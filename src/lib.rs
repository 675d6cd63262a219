//! 자체 호스팅 인증 코어
//!
//! 이메일/비밀번호 계정을 위한 인증 서비스입니다.
//! RS256으로 서명된 액세스/리프레시 토큰 쌍을 발급하고, 리프레시 토큰은 1회용으로 회전시키며
//! 재사용이 감지되면 해당 사용자의 모든 세션을 폐기합니다.
//!
//! # Features
//!
//! - **비밀번호**: 설정 가능한 강도 정책, Argon2id PHC 해시
//! - **JWT**: RS256 토큰 쌍, JWKS 공개키 배포
//! - **세션**: 리프레시 토큰 회전, 재사용 감지, 단일/전체 로그아웃
//! - **계정 잠금**: 연속 로그인 실패 시 일정 시간 잠금
//! - **저장소**: MongoDB 또는 프로세스 메모리
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API + AuthMiddleware
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청 검증/응답 변환
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← AuthService, TokenService, PasswordHasher
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Stores      │ ← UserStore, RefreshTokenStore
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MongoDB/Memory  │
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use saas_auth_core::config::AuthConfig;
//! use saas_auth_core::repositories::{InMemoryRefreshTokenStore, InMemoryUserStore};
//! use saas_auth_core::services::auth::{AuthService, RsaKeyPair, TokenService};
//!
//! let config = AuthConfig::from_env();
//! let keys = RsaKeyPair::load_or_generate(&config.jwt, config.environment)?;
//! let tokens = Arc::new(TokenService::new(keys, &config.jwt));
//! let auth = AuthService::new(
//!     Arc::new(InMemoryUserStore::new()),
//!     Arc::new(InMemoryRefreshTokenStore::new(config.refresh_token_retention)),
//!     tokens,
//!     &config,
//! )?;
//! ```

pub mod config;
pub mod db;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
