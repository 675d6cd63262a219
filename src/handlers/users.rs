//! # User Administration HTTP Handlers
//!
//! `/api/v1/admin` 스코프 아래의 관리자 전용 엔드포인트입니다.
//! 스코프 전체는 `admin:read` 권한을 요구하는 미들웨어로 감싸지고,
//! 변경 작업은 핸들러에서 세부 권한을 한 번 더 확인합니다.
//!
//! | 메서드 | 경로 | 권한 | 설명 |
//! |--------|------|------|------|
//! | `GET` | `/users` | `users:read` | 목록 조회 (`?limit=&offset=`) |
//! | `GET` | `/users/{id}` | `users:read` | 단건 조회 |
//! | `PATCH` | `/users/{id}` | `users:write` | 프로필/상태/역할 수정 |
//! | `POST` | `/users/{id}/verify-email` | `users:write` | 이메일 인증 처리 |
//! | `DELETE` | `/users/{id}` | `users:delete` | 삭제 (세션 폐기 포함) |
//! | `POST` | `/tokens/purge` | `admin:write` | 만료 토큰 정리 |

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::domain::dto::tokens::ApiResponse;
use crate::domain::dto::users::request::{ListUsersQuery, UpdateUserRequest};
use crate::domain::entities::users::UserId;
use crate::domain::models::auth::{Action, Identity, Permission, Resource};
use crate::errors::{AppError, AppResult};
use crate::services::users::UserService;

fn require(identity: &Identity, permission: Permission) -> AppResult<()> {
    if identity.has_permission(&permission) {
        return Ok(());
    }

    log::warn!(
        "권한 부족 - user_id: {}, 필요 권한: {}",
        identity.user_id,
        permission
    );
    Err(AppError::AuthorizationError(format!("{} 권한이 필요합니다", permission)))
}

#[get("/users")]
pub async fn list_users(
    identity: Identity,
    users: web::Data<UserService>,
    query: web::Query<ListUsersQuery>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Users, Action::Read))?;

    let page = users.list_users(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/users/{user_id}")]
pub async fn get_user(
    identity: Identity,
    users: web::Data<UserService>,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Users, Action::Read))?;

    let user = users.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// 사용자 부분 수정
///
/// 상태를 `suspended`/`deleted`로 바꾸면 해당 사용자의 세션이 모두 종료됩니다.
#[patch("/users/{user_id}")]
pub async fn update_user(
    identity: Identity,
    users: web::Data<UserService>,
    path: web::Path<UserId>,
    payload: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Users, Action::Write))?;
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_id = path.into_inner();
    let user = users.update_user(user_id, payload.into_inner().into()).await?;

    log::info!("관리자 {}가 사용자 {} 정보를 수정했습니다", identity.user_id, user_id);
    Ok(HttpResponse::Ok().json(user))
}

#[post("/users/{user_id}/verify-email")]
pub async fn verify_email(
    identity: Identity,
    users: web::Data<UserService>,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Users, Action::Write))?;

    let user = users.verify_email(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    identity: Identity,
    users: web::Data<UserService>,
    path: web::Path<UserId>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Users, Action::Delete))?;

    let user_id = path.into_inner();
    if user_id == identity.user_id {
        return Err(AppError::ValidationError("자기 자신은 삭제할 수 없습니다".to_string()));
    }

    users.delete_user(user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("사용자가 삭제되었습니다")))
}

#[post("/tokens/purge")]
pub async fn purge_tokens(
    identity: Identity,
    users: web::Data<UserService>,
) -> AppResult<HttpResponse> {
    require(&identity, Permission::new(Resource::Admin, Action::Write))?;

    let deleted = users.purge_expired_tokens().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "deleted": deleted }))))
}
