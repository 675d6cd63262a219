//! Authentication HTTP Handlers
//!
//! 이메일/비밀번호 기반 계정의 가입, 로그인, 세션 조회, 비밀번호 변경을 처리합니다.
//!
//! # Endpoints
//!
//! - `POST /api/v1/auth/register` - 가입 (토큰 발급 없음)
//! - `POST /api/v1/auth/login` - 로그인, 토큰 쌍 발급
//! - `GET /api/v1/session/me` - 현재 사용자 (인증 필요)
//! - `POST /api/v1/session/change-password` - 비밀번호 변경 (인증 필요)
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::domain::dto::tokens::ApiResponse;
use crate::domain::dto::users::request::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::domain::dto::users::response::{LoginResponse, UserResponse};
use crate::domain::models::auth::Identity;
use crate::errors::{AppError, AppResult};
use crate::services::auth::AuthProvider;
use crate::services::users::UserService;

use super::token_handlers::{client_context, refresh_cookie};

/// 회원가입 핸들러
///
/// 계정은 `pending_verification` 상태로 생성되며 토큰은 발급하지 않습니다.
#[post("/register")]
pub async fn register(
    auth: web::Data<dyn AuthProvider>,
    payload: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let RegisterRequest { email, password, full_name } = payload.into_inner();
    let user = auth.register(&email, &password, full_name).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// 로컬 로그인 핸들러
///
/// 존재하지 않는 이메일과 잘못된 비밀번호는 같은 401 응답을 받습니다.
/// 리프레시 토큰은 응답 본문과 HttpOnly 쿠키 양쪽으로 전달됩니다.
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    auth: web::Data<dyn AuthProvider>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let (pair, user) = auth
        .login(&payload.email, &payload.password, &client_context(&req))
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&pair))
        .json(LoginResponse::new(user, pair)))
}

/// 현재 로그인한 사용자 정보
#[get("/me")]
pub async fn me(
    identity: Identity,
    users: web::Data<UserService>,
) -> AppResult<HttpResponse> {
    let user = users.get_user(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "user": user,
        "permissions": identity.permissions,
        "expires_at": identity.expires_at,
    })))
}

/// 비밀번호 변경 핸들러
///
/// 성공하면 모든 리프레시 토큰이 폐기되어 다른 기기에서 다시 로그인해야 합니다.
#[post("/change-password")]
pub async fn change_password(
    identity: Identity,
    auth: web::Data<dyn AuthProvider>,
    payload: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    auth.change_password(identity.user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("비밀번호가 변경되었습니다. 다시 로그인해주세요")))
}
