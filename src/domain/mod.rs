//! # Domain Layer Module
//!
//! 인증 코어의 도메인 타입을 모아둔 모듈입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities  - 저장소에 영속되는 사용자, 리프레시 토큰
//! ├── Models    - 토큰 클레임/토큰 쌍, 요청 단위 Identity, 권한 테이블
//! └── DTOs      - HTTP 요청/응답 본문
//!      │
//!      ▼
//! Services (AuthService, TokenService, PasswordHasher)
//!      │
//!      ▼
//! Repositories (UserStore, RefreshTokenStore)
//! ```
//!
//! 엔티티는 MongoDB 문서와 1:1로 매핑되며 `bson::DateTime`을 사용합니다.
//! 토큰 쌍과 Identity처럼 저장되지 않는 값은 `chrono`를 사용합니다.

pub mod entities;
pub mod dto;
pub mod models;

pub use entities::*;
pub use dto::*;
pub use models::*;
