//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::domain::models::auth::{AuthMode, Identity, RequiredPermission};
use crate::errors::AuthError;
use crate::services::auth::{AuthProvider, TokenService};

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub auth: Arc<dyn AuthProvider>,
    pub mode: AuthMode,
    pub required_permission: Option<RequiredPermission>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let auth = self.auth.clone();
        let mode = self.mode;
        let required_permission = self.required_permission.clone();

        Box::pin(async move {
            let auth_result = authenticate(&req, auth.as_ref()).await;

            match (mode, auth_result) {
                // Required 모드에서 인증 실패
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패: {} {} - {}", req.method(), req.path(), err);
                    let (code, message) = match err {
                        AuthError::TokenExpired => ("token_expired", "인증 토큰이 만료되었습니다"),
                        _ => ("authentication_required", "유효한 인증 토큰이 필요합니다"),
                    };
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": code,
                        "message": message
                    }));
                    return Ok(reject(req, response));
                }
                // Required 모드에서 인증 성공
                (AuthMode::Required, Ok(identity)) => {
                    if let Some(ref required) = required_permission {
                        if !required.is_satisfied(&identity.permissions) {
                            log::warn!(
                                "권한 부족: 사용자 ID {} ({}), 필요 권한: {:?}",
                                identity.user_id, identity.role, required
                            );
                            let response = HttpResponse::Forbidden().json(serde_json::json!({
                                "error": "insufficient_permissions",
                                "message": "접근 권한이 부족합니다"
                            }));
                            return Ok(reject(req, response));
                        }
                    }

                    log::debug!("인증 성공: 사용자 ID {}", identity.user_id);
                    req.extensions_mut().insert(identity);
                }
                // Optional 모드에서 인증 성공 (권한이 부족하면 익명으로 진행)
                (AuthMode::Optional, Ok(identity)) => {
                    let permitted = required_permission
                        .as_ref()
                        .map(|required| required.is_satisfied(&identity.permissions))
                        .unwrap_or(true);

                    if permitted {
                        log::debug!("선택적 인증 성공: 사용자 ID {}", identity.user_id);
                        req.extensions_mut().insert(identity);
                    } else {
                        log::debug!("선택적 인증: 권한 부족하지만 진행 허용");
                    }
                }
                // Optional 모드에서 인증 실패 (진행 허용)
                (AuthMode::Optional, Err(_)) => {
                    log::debug!("선택적 인증: 유효한 토큰 없음, 요청 진행");
                }
            }

            // 다음 서비스로 요청 전달
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<B>(req: ServiceRequest, response: HttpResponse) -> ServiceResponse<EitherBody<B>> {
    let (req, _) = req.into_parts();
    ServiceResponse::new(req, response).map_into_right_body()
}

/// `Authorization: Bearer <token>` 헤더를 검증해 [`Identity`]를 만듭니다.
async fn authenticate(req: &ServiceRequest, auth: &dyn AuthProvider) -> Result<Identity, AuthError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(TokenService::extract_bearer_token)
        .ok_or(AuthError::InvalidToken)?;

    auth.verify_token(token).await
}
