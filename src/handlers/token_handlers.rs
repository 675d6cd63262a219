//! 리프레시 토큰 회전과 로그아웃 핸들러
//!
//! 리프레시 토큰은 `refresh_token` 쿠키를 먼저 확인하고, 없으면 JSON 본문에서 읽습니다.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::domain::dto::tokens::{ApiResponse, LogoutRequest, RefreshTokenRequest};
use crate::domain::entities::tokens::ClientContext;
use crate::domain::models::auth::Identity;
use crate::domain::models::token::TokenPair;
use crate::errors::{AppError, AppResult};
use crate::services::auth::AuthProvider;

pub(crate) const REFRESH_COOKIE: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// 갱신과 로그아웃 모두 토큰이 없으면 401
fn missing_refresh_token() -> AppError {
    AppError::AuthenticationError("리프레시 토큰이 필요합니다".to_string())
}

/// 토큰 갱신 API 핸들러
///
/// # Endpoint
/// `POST /api/v1/auth/refresh`
#[post("/refresh")]
pub async fn refresh_token_handler(
    req: HttpRequest,
    auth: web::Data<dyn AuthProvider>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> AppResult<HttpResponse> {
    let refresh_token = presented_refresh_token(&req, body.and_then(|b| b.into_inner().refresh_token))
        .ok_or_else(missing_refresh_token)?;

    let pair = auth.refresh_tokens(&refresh_token, &client_context(&req)).await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&pair))
        .json(ApiResponse::success(pair)))
}

/// 로그아웃 API 핸들러
///
/// 제시된 리프레시 토큰 하나만 폐기합니다. 다른 기기의 세션은 유지됩니다.
#[post("/logout")]
pub async fn logout_handler(
    req: HttpRequest,
    auth: web::Data<dyn AuthProvider>,
    body: Option<web::Json<LogoutRequest>>,
) -> AppResult<HttpResponse> {
    let refresh_token = presented_refresh_token(&req, body.and_then(|b| b.into_inner().refresh_token))
        .ok_or_else(missing_refresh_token)?;

    auth.logout(&refresh_token).await?;

    let mut response = HttpResponse::Ok().json(ApiResponse::message("로그아웃이 성공적으로 처리되었습니다"));
    if let Err(e) = response.add_removal_cookie(&refresh_cookie_named("")) {
        log::error!("리프레시 쿠키 제거 실패: {}", e);
    }
    Ok(response)
}

/// 모든 세션 강제 종료 API
#[post("/logout-all")]
pub async fn logout_all_handler(
    identity: Identity,
    auth: web::Data<dyn AuthProvider>,
) -> AppResult<HttpResponse> {
    let revoked = auth.logout_all(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "revoked_sessions": revoked }))))
}

/// 쿠키 → 본문 순서로 리프레시 토큰을 찾습니다.
fn presented_refresh_token(req: &HttpRequest, from_body: Option<String>) -> Option<String> {
    req.cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or(from_body)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub(crate) fn refresh_cookie(pair: &TokenPair) -> Cookie<'static> {
    let max_age = (pair.refresh_expires_at - chrono::Utc::now()).num_seconds().max(0);
    let mut cookie = refresh_cookie_named(&pair.refresh_token);
    cookie.set_max_age(time::Duration::seconds(max_age));
    cookie
}

fn refresh_cookie_named(value: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, value.to_string())
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish()
}

/// 요청 출처 메타데이터 (IP, User-Agent)
pub(crate) fn client_context(req: &HttpRequest) -> ClientContext {
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    ClientContext::new(extract_client_ip(req), user_agent)
}

/// HTTP 요청에서 클라이언트 IP 주소 추출
///
/// 프록시나 로드 밸런서를 고려하여 다양한 헤더에서 실제 클라이언트 IP를 추출합니다.
///
/// # 우선순위
/// 1. `X-Forwarded-For` (첫 번째 IP)
/// 2. `X-Real-IP`
/// 3. `X-Client-IP`
/// 4. `CF-Connecting-IP` (Cloudflare)
/// 5. 연결 정보에서 peer 주소
pub(crate) fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // 체인의 첫 번째가 원본 클라이언트
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    for name in ["X-Real-IP", "X-Client-IP", "CF-Connecting-IP"] {
        if let Some(ip) = req.headers().get(name).and_then(|h| h.to_str().ok()) {
            return Some(ip.trim().to_string());
        }
    }

    req.peer_addr().map(|peer| peer.ip().to_string())
}
