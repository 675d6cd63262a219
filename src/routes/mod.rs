//! API 라우트 설정 모듈
//!
//! 엔드포인트를 보안 레벨별 스코프로 묶어 등록합니다.
//!
//! | 스코프 | 인증 | 설명 |
//! |--------|------|------|
//! | `/health`, `/.well-known/jwks.json` | 불필요 | 헬스체크, 공개키 |
//! | `/api/v1/auth` | 불필요 | 가입, 로그인, 토큰 갱신, 로그아웃 |
//! | `/api/v1/session` | Bearer 필수 | 내 정보, 비밀번호 변경, 전체 로그아웃 |
//! | `/api/v1/admin` | Bearer + `admin:read` | 사용자 관리 |
//!
//! 보호된 스코프는 [`AuthMiddleware`]로 감싸지므로 인증 공급자를 함께 전달받습니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! let auth: Arc<dyn AuthProvider> = auth_service.clone();
//! App::new().configure(|cfg| configure_all_routes(cfg, auth.clone()))
//! ```

use std::sync::Arc;

use actix_web::web;
use serde_json::json;

use crate::domain::models::auth::{Action, Permission, Resource};
use crate::handlers;
use crate::middlewares::AuthMiddleware;
use crate::services::auth::AuthProvider;

/// 모든 라우트를 설정합니다
///
/// 핸들러가 사용하는 `web::Data<dyn AuthProvider>`, `web::Data<UserService>`,
/// `web::Data<TokenService>`는 호출 측에서 `app_data`로 등록해야 합니다.
pub fn configure_all_routes(cfg: &mut web::ServiceConfig, auth: Arc<dyn AuthProvider>) {
    cfg.service(health_check);
    cfg.service(handlers::rsa::jwks_handler);

    configure_auth_routes(cfg);
    configure_session_routes(cfg, auth.clone());
    configure_admin_routes(cfg, auth);
}

/// 인증이 필요 없는 라우트
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/auth/login \
///   -H "Content-Type: application/json" \
///   -d '{"email":"user@example.com","password":"Passw0rd!"}'
/// ```
fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::login)
            .service(handlers::token_handlers::refresh_token_handler)
            .service(handlers::token_handlers::logout_handler)
    );
}

/// 로그인한 사용자 본인의 세션 라우트
fn configure_session_routes(cfg: &mut web::ServiceConfig, auth: Arc<dyn AuthProvider>) {
    cfg.service(
        web::scope("/api/v1/session")
            .wrap(AuthMiddleware::required(auth))
            .service(handlers::auth::me)
            .service(handlers::auth::change_password)
            .service(handlers::token_handlers::logout_all_handler)
    );
}

/// 관리자 라우트. 세부 권한은 각 핸들러가 다시 확인합니다.
fn configure_admin_routes(cfg: &mut web::ServiceConfig, auth: Arc<dyn AuthProvider>) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(AuthMiddleware::required_with_permission(
                auth,
                Permission::new(Resource::Admin, Action::Read),
            ))
            .service(handlers::users::list_users)
            .service(handlers::users::get_user)
            .service(handlers::users::update_user)
            .service(handlers::users::verify_email)
            .service(handlers::users::delete_user)
            .service(handlers::users::purge_tokens)
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "saas_auth_core",
///   "version": "0.1.0",
///   "timestamp": "2024-01-01T00:00:00Z"
/// }
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
