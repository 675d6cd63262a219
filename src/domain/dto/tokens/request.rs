use serde::Deserialize;

/// 토큰 갱신 요청 DTO
///
/// `refresh_token` 쿠키가 있으면 본문보다 우선합니다.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// 로그아웃 요청 DTO (폐기할 리프레시 토큰)
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}
