use actix_web::{get, web, HttpResponse};

use crate::services::auth::TokenService;

/// 검증 전용 서비스가 가져가는 공개키 집합 (JWKS)
#[get("/.well-known/jwks.json")]
pub async fn jwks_handler(tokens: web::Data<TokenService>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "public, max-age=3600"))
        .json(tokens.jwks())
}
