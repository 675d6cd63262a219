//! JWT 인증 미들웨어
//!
//! ActixWeb 요청 파이프라인에서 액세스 토큰을 검증하고, 성공하면
//! [`Identity`](crate::domain::models::auth::Identity)를 request extensions에 저장합니다.
//! 핸들러는 `Identity` 또는 `OptionalIdentity` 추출자로 꺼내 씁니다.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::models::auth::{AuthMode, Permission, RequiredPermission};
use crate::middlewares::auth_inner::AuthMiddlewareService;
use crate::services::auth::AuthProvider;

/// JWT 인증 미들웨어
#[derive(Clone)]
pub struct AuthMiddleware {
    auth: Arc<dyn AuthProvider>,
    /// 인증 모드 (Required/Optional)
    mode: AuthMode,
    /// 접근에 필요한 권한 (선택사항)
    required_permission: Option<RequiredPermission>,
}

impl AuthMiddleware {
    pub fn new(auth: Arc<dyn AuthProvider>, mode: AuthMode) -> Self {
        Self {
            auth,
            mode,
            required_permission: None,
        }
    }

    /// 필수 인증 미들웨어 생성
    pub fn required(auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(auth, AuthMode::Required)
    }

    /// 선택적 인증 미들웨어 생성
    pub fn optional(auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(auth, AuthMode::Optional)
    }

    /// 특정 권한 요구 인증 미들웨어 생성
    pub fn required_with_permission(auth: Arc<dyn AuthProvider>, permission: Permission) -> Self {
        Self::new(auth, AuthMode::Required).with_requirement(RequiredPermission::Single(permission))
    }

    /// 복수 권한 중 하나 요구 인증 미들웨어 생성
    pub fn required_with_any(auth: Arc<dyn AuthProvider>, permissions: Vec<Permission>) -> Self {
        Self::new(auth, AuthMode::Required).with_requirement(RequiredPermission::Any(permissions))
    }

    pub fn with_requirement(mut self, required: RequiredPermission) -> Self {
        self.required_permission = Some(required);
        self
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            auth: self.auth.clone(),
            mode: self.mode,
            required_permission: self.required_permission.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::domain::models::auth::{Action, Identity, OptionalIdentity, Resource};
    use crate::services::auth::auth_service::tests::{fixture, fixture_with, test_config};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App, HttpResponse};
    use serde_json::{json, Value};

    async fn me(identity: Identity) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "user_id": identity.user_id, "role": identity.role }))
    }

    async fn maybe_me(identity: OptionalIdentity) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "user_id": identity.0.map(|i| i.user_id) }))
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    #[actix_web::test]
    async fn test_required_rejects_missing_token() {
        let f = fixture();
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(AuthMiddleware::required(auth))
                    .route(web::get().to(me)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "authentication_required");

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(bearer("garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_required_attaches_identity() {
        let f = fixture();
        let user = f.registered().await;
        let pair = f.logged_in().await;
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(AuthMiddleware::required(auth))
                    .route(web::get().to(me)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(bearer(&pair.access_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user_id"], user.id);
        assert_eq!(body["role"], "user");
    }

    #[actix_web::test]
    async fn test_refresh_token_is_not_accepted_as_bearer() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(AuthMiddleware::required(auth))
                    .route(web::get().to(me)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(bearer(&pair.refresh_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_expired_token_has_distinct_code() {
        let f = fixture_with(crate::config::AuthConfig {
            jwt: JwtConfig {
                access_token_ttl: chrono::Duration::minutes(-5),
                ..JwtConfig::default()
            },
            ..test_config()
        });
        f.registered().await;
        let pair = f.logged_in().await;
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(AuthMiddleware::required(auth))
                    .route(web::get().to(me)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(bearer(&pair.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "token_expired");
    }

    #[actix_web::test]
    async fn test_missing_permission_is_forbidden() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/admin")
                    .wrap(AuthMiddleware::required_with_permission(
                        auth,
                        Permission::new(Resource::Users, Action::Read),
                    ))
                    .route(web::get().to(me)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(bearer(&pair.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "insufficient_permissions");
    }

    #[actix_web::test]
    async fn test_optional_lets_anonymous_through() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;
        let auth: Arc<dyn AuthProvider> = f.auth.clone();
        let app = test::init_service(
            App::new().service(
                web::resource("/maybe")
                    .wrap(AuthMiddleware::optional(auth))
                    .route(web::get().to(maybe_me)),
            ),
        )
        .await;

        let anonymous: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/maybe").to_request()).await;
        assert_eq!(anonymous["user_id"], Value::Null);

        let req = test::TestRequest::get()
            .uri("/maybe")
            .insert_header(bearer(&pair.access_token))
            .to_request();
        let known: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(known["user_id"], 1);
    }

    #[actix_web::test]
    async fn test_identity_extractor_without_middleware() {
        let app = test::init_service(App::new().route("/me", web::get().to(me))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
