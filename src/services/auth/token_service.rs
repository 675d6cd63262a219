//! JWT 토큰 발급/검증 서비스
//!
//! RS256으로 서명된 액세스/리프레시 토큰 쌍을 발급하고 검증합니다.
//! 검증에는 공개키만 필요하므로 미들웨어는 비밀 없이 토큰을 확인할 수 있습니다.
//!
//! 리프레시 토큰은 저장소에 원본 대신 [`TokenService::hash_token`]의
//! SHA-256 16진수 해시로만 저장됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::entities::users::{UserId, UserRole};
use crate::domain::models::token::{TokenClaims, TokenPair, TokenType};
use crate::errors::AuthError;

use super::jwt_rsa_service::RsaKeyPair;

/// 토큰 매니저
///
/// 서명 키와 검증 규칙은 생성 시 한 번 구성되어 이후 모든 요청에서 공유됩니다.
pub struct TokenService {
    keys: RsaKeyPair,
    issuer: String,
    audience: String,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(keys: RsaKeyPair, config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // 만료 시각은 저장소의 `expires_at`과 같은 기준이어야 하므로 유예 없음
        validation.leeway = 0;

        Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
            validation,
        }
    }

    /// 액세스/리프레시 토큰 쌍 생성
    ///
    /// 두 토큰은 사용자 클레임을 공유하지만 `token_type`, `jti`, 만료 시각이 서로 다릅니다.
    pub fn generate_token_pair(
        &self,
        user_id: UserId,
        email: &str,
        email_verified: bool,
        role: UserRole,
    ) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_expires_at = self.expiry_from(now, self.access_token_ttl)?;
        let refresh_expires_at = self.expiry_from(now, self.refresh_token_ttl)?;

        let claims_for = |token_type: TokenType, expires_at: chrono::DateTime<Utc>| TokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            user_id,
            email: email.to_string(),
            email_verified,
            role,
            token_type,
        };

        let access_token = self.sign(&claims_for(TokenType::Access, access_expires_at))?;
        let refresh_token = self.sign(&claims_for(TokenType::Refresh, refresh_expires_at))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl().num_seconds(),
            expires_at: access_expires_at,
            refresh_expires_at,
        })
    }

    fn expiry_from(
        &self,
        now: chrono::DateTime<Utc>,
        ttl: Duration,
    ) -> Result<chrono::DateTime<Utc>, AuthError> {
        now.checked_add_signed(ttl).ok_or_else(|| {
            log::error!("토큰 만료 시각 계산 실패 - TTL: {}", ttl);
            AuthError::Internal("토큰 만료 시각이 표현 가능한 범위를 벗어났습니다".to_string())
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        encode(&header, claims, self.keys.encoding_key()).map_err(|e| {
            log::error!("JWT 토큰 서명 실패: {}", e);
            AuthError::Internal(format!("토큰 서명 실패: {}", e))
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(token, TokenType::Refresh)
    }

    /// 서명, 알고리즘, 발급자, 대상, 만료, 토큰 용도를 검증합니다.
    ///
    /// 서명이 유효한 만료 토큰만 `TokenExpired`이며, 나머지 실패는 모두 `InvalidToken`입니다.
    fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let claims = decode::<TokenClaims>(token, self.keys.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    log::debug!("토큰 검증 실패: {}", e);
                    AuthError::InvalidToken
                }
            })?;

        if claims.token_type != expected {
            log::warn!(
                "토큰 용도 불일치 - 기대: {:?}, 실제: {:?}, user_id: {}",
                expected, claims.token_type, claims.user_id
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// 토큰의 SHA-256 16진수 해시 (64자)
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// `Authorization` 헤더 값에서 Bearer 토큰을 꺼냅니다.
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        let (scheme, token) = auth_header.trim().split_once(' ')?;
        let token = token.trim();

        if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
            Some(token)
        } else {
            None
        }
    }

    pub fn jwks(&self) -> serde_json::Value {
        self.keys.jwks()
    }

    /// 액세스 토큰 수명 (응답의 `expires_in` 기준)
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::EncodingKey;

    const PRIMARY_PRIVATE: &str = include_str!("testdata/primary_private.pem");
    const PRIMARY_PUBLIC: &str = include_str!("testdata/primary_public.pem");
    const SECONDARY_PRIVATE: &str = include_str!("testdata/secondary_private.pem");
    const SECONDARY_PUBLIC: &str = include_str!("testdata/secondary_public.pem");

    pub(crate) fn primary_keys() -> RsaKeyPair {
        RsaKeyPair::from_pem(PRIMARY_PRIVATE, PRIMARY_PUBLIC, "auth-key-1").unwrap()
    }

    pub(crate) fn token_service() -> TokenService {
        TokenService::new(primary_keys(), &JwtConfig::default())
    }

    fn service_with(config: JwtConfig) -> TokenService {
        TokenService::new(primary_keys(), &config)
    }

    fn pair(service: &TokenService) -> TokenPair {
        service.generate_token_pair(7, "a@x.com", false, UserRole::User).unwrap()
    }

    #[test]
    fn test_pair_round_trip() {
        let service = token_service();
        let tokens = pair(&service);

        let access = service.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(access.user_id, 7);
        assert_eq!(access.sub, "7");
        assert_eq!(access.email, "a@x.com");
        assert_eq!(access.role, UserRole::User);
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(access.iss, "saas-auth-core");
        assert_eq!(access.aud, "saas-api");

        let refresh = service.verify_refresh_token(&tokens.refresh_token).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_expiry_horizons() {
        let service = token_service();
        let before = Utc::now();
        let tokens = pair(&service);

        assert_eq!(tokens.expires_in, service.access_token_ttl().num_seconds());
        assert_eq!(tokens.expires_in, 15 * 60);
        assert_eq!(tokens.token_type, "Bearer");
        let access_minutes = (tokens.expires_at - before).num_minutes();
        let refresh_days = (tokens.refresh_expires_at - before).num_days();
        assert!((14..=15).contains(&access_minutes));
        assert!((6..=7).contains(&refresh_days));
    }

    #[test]
    fn test_type_confusion_is_rejected() {
        let service = token_service();
        let tokens = pair(&service);

        assert_eq!(service.verify_refresh_token(&tokens.access_token), Err(AuthError::InvalidToken));
        assert_eq!(service.verify_access_token(&tokens.refresh_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let service = service_with(JwtConfig {
            access_token_ttl: Duration::minutes(-5),
            ..JwtConfig::default()
        });
        let tokens = pair(&service);

        assert_eq!(service.verify_access_token(&tokens.access_token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_recently_expired_token_has_no_grace_period() {
        let service = service_with(JwtConfig {
            access_token_ttl: Duration::seconds(-30),
            refresh_token_ttl: Duration::seconds(-30),
            ..JwtConfig::default()
        });
        let tokens = pair(&service);

        assert_eq!(service.verify_access_token(&tokens.access_token), Err(AuthError::TokenExpired));
        assert_eq!(service.verify_refresh_token(&tokens.refresh_token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_unrepresentable_expiry_is_internal_error() {
        let service = service_with(JwtConfig {
            refresh_token_ttl: Duration::days(1_000_000_000),
            ..JwtConfig::default()
        });

        let result = service.generate_token_pair(7, "a@x.com", false, UserRole::User);
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_wrong_algorithm_is_invalid() {
        let service = token_service();
        let claims = service.verify_access_token(&pair(&service).access_token).unwrap();

        let forged = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(PRIMARY_PUBLIC.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify_access_token(&forged), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_issuer_or_audience_is_invalid() {
        let service = token_service();

        let other_issuer = service_with(JwtConfig { issuer: "someone-else".to_string(), ..JwtConfig::default() });
        let tokens = pair(&other_issuer);
        assert_eq!(service.verify_access_token(&tokens.access_token), Err(AuthError::InvalidToken));

        let other_audience = service_with(JwtConfig { audience: "other-api".to_string(), ..JwtConfig::default() });
        let tokens = pair(&other_audience);
        assert_eq!(service.verify_access_token(&tokens.access_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_foreign_signing_key_is_invalid() {
        let service = token_service();
        let foreign_keys = RsaKeyPair::from_pem(SECONDARY_PRIVATE, SECONDARY_PUBLIC, "auth-key-1").unwrap();
        let foreign = TokenService::new(foreign_keys, &JwtConfig::default());

        let tokens = pair(&foreign);
        assert_eq!(service.verify_access_token(&tokens.access_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let service = token_service();
        assert_eq!(service.verify_access_token("not.a.jwt"), Err(AuthError::InvalidToken));
        assert_eq!(service.verify_access_token(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = TokenService::hash_token("refresh-token-value");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, TokenService::hash_token("refresh-token-value"));
        assert_ne!(hash, TokenService::hash_token("refresh-token-value2"));
        assert_eq!(
            TokenService::hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(TokenService::extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(TokenService::extract_bearer_token("bearer  abc"), Some("abc"));
        assert_eq!(TokenService::extract_bearer_token("Basic abc"), None);
        assert_eq!(TokenService::extract_bearer_token("Bearer "), None);
        assert_eq!(TokenService::extract_bearer_token("abc"), None);
    }
}
