//! 미들웨어 모듈
//!
//! ActixWeb 애플리케이션의 요청 처리 파이프라인에서 사용되는 미들웨어들을 제공합니다.
//!
//! # 제공 미들웨어
//!
//! ### 1. 인증 미들웨어 (AuthMiddleware)
//! - Bearer 액세스 토큰 추출 및 검증
//! - 역할 기반 권한 확인
//! - 인증 신원을 request extension에 저장
//! - 선택적/강제 인증 모드 지원
//!
//! # 사용 방법
//!
//! 미들웨어는 `main`에서 만든 인증 서비스를 생성자로 받습니다.
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//!
//! let auth: Arc<dyn AuthProvider> = auth_service.clone();
//!
//! App::new()
//!     .service(
//!         web::scope("/api/v1/session")
//!             .wrap(AuthMiddleware::required(auth.clone()))
//!             .route("/me", web::get().to(me))
//!     )
//!     .service(
//!         web::scope("/api/v1/admin")
//!             .wrap(AuthMiddleware::required_with_permission(auth, Permission::new(Resource::Users, Action::Read)))
//!             .route("/users", web::get().to(list_users))
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;

// 미들웨어 재export
pub use auth_middleware::AuthMiddleware;
