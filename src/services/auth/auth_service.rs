//! # 인증 서비스 구현
//!
//! 비밀번호 해셔, 토큰 매니저, 사용자 저장소, 리프레시 토큰 저장소를 조합해
//! 회원가입, 로그인, 토큰 갱신, 로그아웃, 비밀번호 변경을 처리합니다.
//!
//! ## 로그인 상태 흐름
//!
//! ```text
//! get_by_email ──(없음)──▶ 더미 해시 검증 ──▶ InvalidCredentials
//!      │
//!      ▼
//! locked_until > now ──▶ AccountLocked
//!      │
//!      ▼
//! status ∉ {active, pending_verification} ──▶ AccountInactive
//!      │
//!      ▼
//! verify ──(불일치)──▶ increment (증가 후 값) ≥ 임계값 ? lock_until : - ──▶ InvalidCredentials
//!      │
//!      ▼
//! reset 실패 횟수 → 토큰 쌍 발급 → 리프레시 해시 저장 → last_login 기록
//! ```
//!
//! ## 리프레시 토큰 회전
//!
//! 리프레시 토큰은 1회용입니다. 새 토큰 쌍을 먼저 저장한 뒤 제시된 토큰을
//! 조건부로 폐기하며, 폐기에 실패하면(이미 다른 요청이 폐기함) 재사용으로 보고
//! 사용자의 모든 리프레시 토큰을 폐기합니다. 취소로 중간에 끊겨도 기존 토큰은
//! 저장소가 폐기를 확인하기 전까지 유효하게 남습니다.
//!
//! ## 기한과 취소
//!
//! 모든 작업은 `request_timeout` 기한 안에서 실행되며 넘기면 [`AuthError::Timeout`]입니다.
//! 요청이 끊겨 future가 drop되면 진행 중인 저장소 호출도 함께 취소됩니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::{task, time};
use async_trait::async_trait;
use mongodb::bson::DateTime;
use serde_json::{Map, Value};

use crate::config::{AuthConfig, LockoutConfig};
use crate::domain::entities::tokens::ClientContext;
use crate::domain::entities::users::{normalize_email, NewUser, User, UserId, UserRole};
use crate::domain::models::auth::{Identity, RolePermissions};
use crate::domain::models::token::TokenPair;
use crate::errors::{AuthError, PasswordHashError, StoreError};
use crate::repositories::tokens::RefreshTokenStore;
use crate::repositories::users::UserStore;

use super::password_service::{PasswordHasher, PasswordPolicy};
use super::token_service::TokenService;

/// 인증 제공자 계약
///
/// 라우팅 계층과 미들웨어는 이 트레이트에만 의존합니다.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 새 계정을 `pending_verification` 상태로 생성합니다. 토큰은 발급하지 않습니다.
    async fn register(&self, email: &str, password: &str, full_name: Option<String>) -> Result<User, AuthError>;

    async fn login(&self, email: &str, password: &str, client: &ClientContext) -> Result<(TokenPair, User), AuthError>;

    /// 리프레시 토큰을 회전하여 새 토큰 쌍을 발급합니다.
    async fn refresh_tokens(&self, refresh_token: &str, client: &ClientContext) -> Result<TokenPair, AuthError>;

    /// 제시된 리프레시 토큰 하나만 폐기합니다.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// 사용자의 모든 리프레시 토큰을 폐기하고 폐기된 개수를 반환합니다.
    async fn logout_all(&self, user_id: UserId) -> Result<u64, AuthError>;

    async fn change_password(&self, user_id: UserId, current_password: &str, new_password: &str) -> Result<(), AuthError>;

    /// 액세스 토큰을 검증하고 역할 권한이 포함된 [`Identity`]를 반환합니다.
    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError>;
}

/// 로컬 계정(이메일/비밀번호) + RS256 JWT 인증 서비스
///
/// 시작 시 한 번 생성되어 `Arc`로 공유됩니다. 자체적인 가변 상태는 없으며
/// 모든 조정은 저장소의 원자적 연산에 맡깁니다.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    policy: PasswordPolicy,
    permissions: RolePermissions,
    lockout: LockoutConfig,
    request_timeout: Duration,
    /// 존재하지 않는 이메일 로그인 시 검증에 쓰는 해시
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        tokens: Arc<TokenService>,
        config: &AuthConfig,
    ) -> Result<Self, PasswordHashError> {
        let hasher = PasswordHasher::new(config.hashing)?;
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            users,
            refresh_tokens,
            tokens,
            hasher: Arc::new(hasher),
            policy: PasswordPolicy::new(config.password_policy.clone()),
            permissions: RolePermissions::default(),
            lockout: config.lockout,
            request_timeout: config.request_timeout,
            dummy_hash,
        })
    }

    pub fn token_service(&self) -> &TokenService {
        &self.tokens
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        match time::timeout(self.request_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("⏱️ 인증 작업 기한 초과: {} ({:?})", operation, self.request_timeout);
                Err(AuthError::Timeout)
            }
        }
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce(&PasswordHasher) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        task::spawn_blocking(move || work(&hasher))
            .await
            .map_err(|e| AuthError::Internal(format!("해싱 작업 실패: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        self.run_blocking(move |hasher| hasher.hash(&password)).await
    }

    async fn verify_password(&self, password: &str, encoded_hash: String) -> Result<bool, AuthError> {
        let password = password.to_owned();
        self.run_blocking(move |hasher| hasher.verify(&password, &encoded_hash)).await
    }

    /// 토큰 쌍을 생성하고 리프레시 토큰 해시를 저장합니다.
    async fn issue_token_pair(&self, user: &User, client: &ClientContext) -> Result<TokenPair, AuthError> {
        let pair = self
            .tokens
            .generate_token_pair(user.id, &user.email, user.email_verified, user.role)?;

        let token_hash = TokenService::hash_token(&pair.refresh_token);
        let expires_at = DateTime::from_millis(pair.refresh_expires_at.timestamp_millis());
        self.refresh_tokens
            .create(user.id, &token_hash, expires_at, client)
            .await?;

        Ok(pair)
    }

    /// 재사용이 감지된 사용자의 모든 리프레시 토큰을 폐기합니다.
    async fn reject_reused_token(&self, user_id: UserId, token_hash: &str) -> AuthError {
        log::warn!(
            "🚨 리프레시 토큰 재사용 감지 - user_id: {}, token: {}…",
            user_id,
            &token_hash[..token_hash.len().min(8)]
        );

        match self.refresh_tokens.revoke_all_for_user(user_id).await {
            Ok(count) => {
                log::warn!("🔒 재사용 대응으로 user_id {}의 리프레시 토큰 {}개 폐기", user_id, count);
                AuthError::InvalidToken
            }
            Err(e) => {
                log::error!("재사용 대응 중 일괄 폐기 실패 - user_id: {}: {}", user_id, e);
                AuthError::from(e)
            }
        }
    }

    async fn register_inner(&self, email: &str, password: &str, full_name: Option<String>) -> Result<User, AuthError> {
        let email = normalize_email(email);
        self.policy.validate(password)?;

        let password_hash = self.hash_password(password).await?;
        let input = NewUser {
            email,
            password_hash,
            full_name: full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            role: UserRole::User,
        };

        match self.users.create(input).await {
            Ok(user) => {
                log::info!("✅ 신규 계정 등록 - user_id: {}", user.id);
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => Err(AuthError::EmailAlreadyRegistered),
            Err(e) => Err(e.into()),
        }
    }

    async fn login_inner(&self, email: &str, password: &str, client: &ClientContext) -> Result<(TokenPair, User), AuthError> {
        let email = normalize_email(email);

        let mut user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                // 응답 시간을 실제 검증과 맞춤
                let _ = self.verify_password(password, self.dummy_hash.clone()).await;
                log::info!("로그인 실패 - 등록되지 않은 이메일");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let now = DateTime::now();
        if user.is_locked_at(now) {
            log::warn!("🔒 잠긴 계정 로그인 시도 - user_id: {}", user.id);
            return Err(AuthError::AccountLocked);
        }
        if !user.status.can_login() {
            log::warn!("비활성 계정 로그인 시도 - user_id: {}, status: {}", user.id, user.status.as_str());
            return Err(AuthError::AccountInactive);
        }

        // 잠금 기간이 지난 계정은 카운터를 초기화한 뒤 검사
        if user.locked_until.is_some() {
            match self.users.reset_failed_attempts(user.id).await {
                Ok(()) => {
                    user.failed_login_attempts = 0;
                    user.locked_until = None;
                }
                Err(e) => log::error!("만료된 잠금 초기화 실패 - user_id: {}: {}", user.id, e),
            }
        }

        if !self.verify_password(password, user.password_hash.clone()).await? {
            let attempts = self.users.increment_failed_attempts(user.id).await?;
            log::info!("로그인 실패 - user_id: {}, 연속 실패: {}", user.id, attempts);

            if attempts >= self.lockout.max_failed_attempts {
                let until = DateTime::from_millis(
                    now.timestamp_millis() + self.lockout.lockout_duration.num_milliseconds(),
                );
                self.users.lock_until(user.id, until).await?;
                log::warn!(
                    "🔒 계정 잠금 - user_id: {}, 실패 {}회, {}분간",
                    user.id,
                    attempts,
                    self.lockout.lockout_duration.num_minutes()
                );
            }
            return Err(AuthError::InvalidCredentials);
        }

        if user.failed_login_attempts > 0 {
            match self.users.reset_failed_attempts(user.id).await {
                Ok(()) => user.failed_login_attempts = 0,
                Err(e) => log::error!("실패 횟수 초기화 실패 - user_id: {}: {}", user.id, e),
            }
        }

        let pair = self.issue_token_pair(&user, client).await?;

        match self.users.update_last_login(user.id, client.ip_address.as_deref()).await {
            Ok(()) => {
                user.last_login_at = Some(now);
                user.last_login_ip = client.ip_address.clone();
            }
            Err(e) => log::error!("마지막 로그인 정보 기록 실패 - user_id: {}: {}", user.id, e),
        }

        log::info!("✅ 로그인 성공 - user_id: {}", user.id);
        Ok((pair, user))
    }

    async fn refresh_inner(&self, refresh_token: &str, client: &ClientContext) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_refresh_token(refresh_token)?;
        let token_hash = TokenService::hash_token(refresh_token);

        let stored = match self.refresh_tokens.get_by_hash(&token_hash).await {
            Ok(stored) => stored,
            Err(StoreError::NotFound) => {
                log::debug!("저장소에 없는 리프레시 토큰 - user_id: {}", claims.user_id);
                return Err(AuthError::InvalidToken);
            }
            Err(e) => return Err(e.into()),
        };

        if stored.user_id != claims.user_id {
            log::warn!(
                "리프레시 토큰 소유자 불일치 - 클레임: {}, 저장소: {}",
                claims.user_id, stored.user_id
            );
            return Err(AuthError::InvalidToken);
        }
        if stored.revoked {
            return Err(self.reject_reused_token(stored.user_id, &token_hash).await);
        }

        let user = match self.users.get_by_id(stored.user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
            Err(e) => return Err(e.into()),
        };
        if !user.status.can_login() {
            return Err(AuthError::AccountInactive);
        }

        let pair = self.issue_token_pair(&user, client).await?;

        if !self.refresh_tokens.revoke(&token_hash).await? {
            // 동시 갱신 경쟁에서 진 요청
            return Err(self.reject_reused_token(user.id, &token_hash).await);
        }

        log::info!("🔄 리프레시 토큰 회전 - user_id: {}", user.id);
        Ok(pair)
    }

    async fn logout_inner(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = TokenService::hash_token(refresh_token);

        if self.refresh_tokens.revoke(&token_hash).await? {
            log::info!("👋 로그아웃 - token: {}…", &token_hash[..8]);
        } else {
            log::debug!("로그아웃 대상 토큰 없음 또는 이미 폐기됨");
        }
        Ok(())
    }

    async fn logout_all_inner(&self, user_id: UserId) -> Result<u64, AuthError> {
        let count = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        log::info!("👋 전체 로그아웃 - user_id: {}, 폐기: {}개", user_id, count);
        Ok(count)
    }

    async fn change_password_inner(&self, user_id: UserId, current_password: &str, new_password: &str) -> Result<(), AuthError> {
        let user = match self.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !self.verify_password(current_password, user.password_hash).await? {
            log::info!("비밀번호 변경 실패 - 현재 비밀번호 불일치, user_id: {}", user_id);
            return Err(AuthError::InvalidCredentials);
        }

        self.policy.validate(new_password)?;
        let password_hash = self.hash_password(new_password).await?;
        self.users.update_password(user_id, &password_hash).await?;

        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        log::info!("🔑 비밀번호 변경 - user_id: {}, 폐기된 세션: {}개", user_id, revoked);
        Ok(())
    }

    fn identity_from(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.tokens.verify_access_token(token)?;
        let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;
        let raw = match serde_json::to_value(&claims) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Ok(Identity {
            user_id: claims.user_id,
            email: claims.email,
            email_verified: claims.email_verified,
            role: claims.role,
            permissions: self.permissions.for_role(claims.role),
            expires_at,
            raw,
        })
    }
}

#[async_trait]
impl AuthProvider for AuthService {
    async fn register(&self, email: &str, password: &str, full_name: Option<String>) -> Result<User, AuthError> {
        self.with_deadline("register", self.register_inner(email, password, full_name)).await
    }

    async fn login(&self, email: &str, password: &str, client: &ClientContext) -> Result<(TokenPair, User), AuthError> {
        self.with_deadline("login", self.login_inner(email, password, client)).await
    }

    async fn refresh_tokens(&self, refresh_token: &str, client: &ClientContext) -> Result<TokenPair, AuthError> {
        self.with_deadline("refresh_tokens", self.refresh_inner(refresh_token, client)).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.with_deadline("logout", self.logout_inner(refresh_token)).await
    }

    async fn logout_all(&self, user_id: UserId) -> Result<u64, AuthError> {
        self.with_deadline("logout_all", self.logout_all_inner(user_id)).await
    }

    async fn change_password(&self, user_id: UserId, current_password: &str, new_password: &str) -> Result<(), AuthError> {
        self.with_deadline(
            "change_password",
            self.change_password_inner(user_id, current_password, new_password),
        )
        .await
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        self.identity_from(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{HashingConfig, JwtConfig};
    use crate::domain::entities::users::{UpdateUser, UserStatus};
    use crate::domain::models::auth::{Action, Permission, Resource};
    use crate::repositories::tokens::InMemoryRefreshTokenStore;
    use crate::repositories::users::InMemoryUserStore;
    use crate::services::auth::token_service::tests::primary_keys;
    use chrono::Timelike;
    use futures_util::future::join;

    pub(crate) const EMAIL: &str = "a@x.com";
    pub(crate) const PASSWORD: &str = "Passw0rd!";

    pub(crate) struct Fixture {
        pub(crate) users: Arc<InMemoryUserStore>,
        pub(crate) refresh_tokens: Arc<InMemoryRefreshTokenStore>,
        pub(crate) auth: Arc<AuthService>,
    }

    pub(crate) fn test_config() -> AuthConfig {
        AuthConfig {
            hashing: HashingConfig {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
            ..AuthConfig::default()
        }
    }

    pub(crate) fn fixture_with(config: AuthConfig) -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::default());
        let tokens = Arc::new(TokenService::new(primary_keys(), &config.jwt));
        let auth = AuthService::new(users.clone(), refresh_tokens.clone(), tokens, &config).unwrap();

        Fixture {
            users,
            refresh_tokens,
            auth: Arc::new(auth),
        }
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_with(test_config())
    }

    fn client() -> ClientContext {
        ClientContext::new(Some("203.0.113.7".to_string()), Some("test-agent".to_string()))
    }

    impl Fixture {
        pub(crate) async fn registered(&self) -> User {
            self.auth.register(EMAIL, PASSWORD, Some("Ann".to_string())).await.unwrap()
        }

        pub(crate) async fn logged_in(&self) -> TokenPair {
            self.auth.login(EMAIL, PASSWORD, &client()).await.unwrap().0
        }
    }

    #[actix_web::test]
    async fn test_register_then_login_scenario() {
        let f = fixture();
        let user = f.auth.register(" A@X.com ", PASSWORD, Some("Ann".to_string())).await.unwrap();

        assert_eq!(user.status, UserStatus::PendingVerification);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.email, EMAIL);
        assert_eq!(user.full_name.as_deref(), Some("Ann"));
        assert!(user.password_hash.starts_with("$argon2id$"));

        let before = chrono::Utc::now();
        let (pair, logged_in) = f.auth.login(EMAIL, PASSWORD, &client()).await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!((14..=15).contains(&(pair.expires_at - before).num_minutes()));
        assert!((6..=7).contains(&(pair.refresh_expires_at - before).num_days()));

        let stored = f.users.get_by_id(user.id).await.unwrap();
        assert_eq!(stored.last_login_ip.as_deref(), Some("203.0.113.7"));
        assert!(stored.last_login_at.is_some());

        let hash = TokenService::hash_token(&pair.refresh_token);
        let token = f.refresh_tokens.get_by_hash(&hash).await.unwrap();
        assert_eq!(token.user_id, user.id);
        assert_eq!(token.user_agent.as_deref(), Some("test-agent"));
    }

    #[actix_web::test]
    async fn test_register_rejects_policy_violation_and_duplicates() {
        let f = fixture();

        let weak = f.auth.register(EMAIL, "password", None).await;
        assert!(matches!(weak, Err(AuthError::PolicyViolation(_))));

        f.registered().await;
        let duplicate = f.auth.register("A@x.COM", PASSWORD, None).await;
        assert_eq!(duplicate.unwrap_err(), AuthError::EmailAlreadyRegistered);
    }

    #[actix_web::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let f = fixture();
        f.registered().await;

        let unknown = f.auth.login("nobody@x.com", PASSWORD, &client()).await;
        let wrong = f.auth.login(EMAIL, "Wrong0rd!", &client()).await;
        assert_eq!(unknown.unwrap_err(), AuthError::InvalidCredentials);
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[actix_web::test]
    async fn test_lockout_after_threshold() {
        let f = fixture();
        let user = f.registered().await;

        for _ in 0..5 {
            let result = f.auth.login(EMAIL, "Wrong0rd!", &client()).await;
            assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
        }

        let locked = f.auth.login(EMAIL, PASSWORD, &client()).await;
        assert_eq!(locked.unwrap_err(), AuthError::AccountLocked);

        let stored = f.users.get_by_id(user.id).await.unwrap();
        assert_eq!(stored.failed_login_attempts, 5);
        assert!(stored.is_locked_at(DateTime::now()));
    }

    #[actix_web::test]
    async fn test_expired_lock_resets_counter() {
        let f = fixture();
        let user = f.registered().await;
        for _ in 0..5 {
            f.users.increment_failed_attempts(user.id).await.unwrap();
        }
        let past = DateTime::from_millis(DateTime::now().timestamp_millis() - 1_000);
        f.users.lock_until(user.id, past).await.unwrap();

        let wrong = f.auth.login(EMAIL, "Wrong0rd!", &client()).await;
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredentials);

        let stored = f.users.get_by_id(user.id).await.unwrap();
        assert_eq!(stored.failed_login_attempts, 1);
        assert!(!stored.is_locked_at(DateTime::now()));

        assert!(f.auth.login(EMAIL, PASSWORD, &client()).await.is_ok());
        assert_eq!(f.users.get_by_id(user.id).await.unwrap().failed_login_attempts, 0);
    }

    #[actix_web::test]
    async fn test_successful_login_resets_failures() {
        let f = fixture();
        let user = f.registered().await;
        for _ in 0..3 {
            let _ = f.auth.login(EMAIL, "Wrong0rd!", &client()).await;
        }

        f.logged_in().await;
        assert_eq!(f.users.get_by_id(user.id).await.unwrap().failed_login_attempts, 0);

        // 초기화 후에는 다시 5회가 필요
        for _ in 0..4 {
            let _ = f.auth.login(EMAIL, "Wrong0rd!", &client()).await;
        }
        assert!(f.auth.login(EMAIL, PASSWORD, &client()).await.is_ok());
    }

    #[actix_web::test]
    async fn test_inactive_accounts_cannot_login() {
        let f = fixture();
        let user = f.registered().await;

        let suspended = UpdateUser {
            status: Some(UserStatus::Suspended),
            ..UpdateUser::default()
        };
        f.users.update(user.id, suspended).await.unwrap();

        let result = f.auth.login(EMAIL, PASSWORD, &client()).await;
        assert_eq!(result.unwrap_err(), AuthError::AccountInactive);
    }

    #[actix_web::test]
    async fn test_refresh_rotation_is_single_use() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;

        let rotated = f.auth.refresh_tokens(&pair.refresh_token, &client()).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let replay = f.auth.refresh_tokens(&pair.refresh_token, &client()).await;
        assert_eq!(replay.unwrap_err(), AuthError::InvalidToken);
    }

    #[actix_web::test]
    async fn test_reuse_revokes_every_session() {
        let f = fixture();
        f.registered().await;
        let first = f.logged_in().await;
        let other_session = f.logged_in().await;

        let rotated = f.auth.refresh_tokens(&first.refresh_token, &client()).await.unwrap();

        // 폐기된 토큰 재사용 → 전체 폐기
        let reuse = f.auth.refresh_tokens(&first.refresh_token, &client()).await;
        assert_eq!(reuse.unwrap_err(), AuthError::InvalidToken);

        for token in [&rotated.refresh_token, &other_session.refresh_token] {
            let result = f.auth.refresh_tokens(token, &client()).await;
            assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
        }
    }

    #[actix_web::test]
    async fn test_concurrent_refresh_succeeds_once() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;
        let ctx = client();

        let (a, b) = join(
            f.auth.refresh_tokens(&pair.refresh_token, &ctx),
            f.auth.refresh_tokens(&pair.refresh_token, &ctx),
        )
        .await;

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let loser = if a.is_ok() { b } else { a };
        assert_eq!(loser.unwrap_err(), AuthError::InvalidToken);
    }

    #[actix_web::test]
    async fn test_refresh_rejects_access_token_and_unknown_token() {
        let f = fixture();
        f.registered().await;
        let pair = f.logged_in().await;

        let confused = f.auth.refresh_tokens(&pair.access_token, &client()).await;
        assert_eq!(confused.unwrap_err(), AuthError::InvalidToken);

        // 서명은 유효하지만 저장소에 없는 토큰
        let unsaved = f
            .auth
            .token_service()
            .generate_token_pair(1, EMAIL, false, UserRole::User)
            .unwrap();
        let result = f.auth.refresh_tokens(&unsaved.refresh_token, &client()).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[actix_web::test]
    async fn test_refresh_sees_suspension() {
        let f = fixture();
        let user = f.registered().await;
        let pair = f.logged_in().await;

        let suspended = UpdateUser {
            status: Some(UserStatus::Suspended),
            ..UpdateUser::default()
        };
        f.users.update(user.id, suspended).await.unwrap();

        let result = f.auth.refresh_tokens(&pair.refresh_token, &client()).await;
        assert_eq!(result.unwrap_err(), AuthError::AccountInactive);
    }

    #[actix_web::test]
    async fn test_expired_refresh_token() {
        // 만료 직후 토큰도 저장소 조회 전에 만료로 구분되어야 함
        let f = fixture_with(AuthConfig {
            jwt: JwtConfig {
                refresh_token_ttl: chrono::Duration::seconds(-30),
                ..JwtConfig::default()
            },
            ..test_config()
        });
        f.registered().await;
        let pair = f.logged_in().await;

        let result = f.auth.refresh_tokens(&pair.refresh_token, &client()).await;
        assert_eq!(result.unwrap_err(), AuthError::TokenExpired);
    }

    #[actix_web::test]
    async fn test_logout_revokes_only_presented_token() {
        let f = fixture();
        let user = f.registered().await;
        let first = f.logged_in().await;
        let second = f.logged_in().await;

        f.auth.logout(&first.refresh_token).await.unwrap();
        // 같은 토큰으로 다시 로그아웃해도 성공
        f.auth.logout(&first.refresh_token).await.unwrap();

        assert!(f.auth.refresh_tokens(&second.refresh_token, &client()).await.is_ok());

        let third = f.logged_in().await;
        let fourth = f.logged_in().await;
        assert_eq!(f.auth.logout_all(user.id).await.unwrap(), 3);
        for token in [&third.refresh_token, &fourth.refresh_token] {
            assert!(f.auth.refresh_tokens(token, &client()).await.is_err());
        }
    }

    #[actix_web::test]
    async fn test_change_password_with_wrong_current_changes_nothing() {
        let f = fixture();
        let user = f.registered().await;
        let pair = f.logged_in().await;
        let hash_before = f.users.get_by_id(user.id).await.unwrap().password_hash;

        let result = f.auth.change_password(user.id, "Wrong0rd!", "N3wPassword!").await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);

        assert_eq!(f.users.get_by_id(user.id).await.unwrap().password_hash, hash_before);
        assert!(f.auth.refresh_tokens(&pair.refresh_token, &client()).await.is_ok());
    }

    #[actix_web::test]
    async fn test_change_password_revokes_sessions() {
        let f = fixture();
        let user = f.registered().await;
        let pair = f.logged_in().await;

        let weak = f.auth.change_password(user.id, PASSWORD, "short").await;
        assert!(matches!(weak, Err(AuthError::PolicyViolation(_))));

        f.auth.change_password(user.id, PASSWORD, "N3wPassword!").await.unwrap();

        assert_eq!(
            f.auth.refresh_tokens(&pair.refresh_token, &client()).await.unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            f.auth.login(EMAIL, PASSWORD, &client()).await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert!(f.auth.login(EMAIL, "N3wPassword!", &client()).await.is_ok());
        assert!(f.users.get_by_id(user.id).await.unwrap().password_changed_at.is_some());
    }

    #[actix_web::test]
    async fn test_verify_token_maps_role_permissions() {
        let f = fixture();
        let user = f.registered().await;
        let pair = f.logged_in().await;

        let identity = f.auth.verify_token(&pair.access_token).await.unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, EMAIL);
        assert!(!identity.is_admin());
        assert!(identity.has_permission(&Permission::new(Resource::Files, Action::Write)));
        assert!(!identity.has_permission(&Permission::new(Resource::Users, Action::Read)));
        assert_eq!(identity.raw.get("token_type"), Some(&Value::from("access")));
        assert_eq!(identity.expires_at, pair.expires_at.with_nanosecond(0).unwrap());

        let refresh_as_access = f.auth.verify_token(&pair.refresh_token).await;
        assert_eq!(refresh_as_access.unwrap_err(), AuthError::InvalidToken);
    }

    #[actix_web::test]
    async fn test_admin_identity() {
        let f = fixture();
        let user = f.registered().await;
        let promote = UpdateUser {
            role: Some(UserRole::Admin),
            ..UpdateUser::default()
        };
        f.users.update(user.id, promote).await.unwrap();

        let pair = f.logged_in().await;
        let identity = f.auth.verify_token(&pair.access_token).await.unwrap();
        assert!(identity.is_admin());
        assert!(identity.has_permission(&Permission::new(Resource::Users, Action::Delete)));
    }

    /// 조회가 끝나지 않는 저장소
    struct StalledUserStore;

    #[async_trait]
    impl UserStore for StalledUserStore {
        async fn create(&self, _: NewUser) -> Result<User, StoreError> {
            std::future::pending().await
        }
        async fn get_by_id(&self, _: UserId) -> Result<User, StoreError> {
            std::future::pending().await
        }
        async fn get_by_email(&self, _: &str) -> Result<User, StoreError> {
            std::future::pending().await
        }
        async fn update(&self, _: UserId, _: UpdateUser) -> Result<User, StoreError> {
            std::future::pending().await
        }
        async fn update_password(&self, _: UserId, _: &str) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn mark_email_verified(&self, _: UserId) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn update_last_login(&self, _: UserId, _: Option<&str>) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn increment_failed_attempts(&self, _: UserId) -> Result<i32, StoreError> {
            std::future::pending().await
        }
        async fn reset_failed_attempts(&self, _: UserId) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn lock_until(&self, _: UserId, _: DateTime) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _: UserId) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn list(&self, _: i64, _: u64) -> Result<Vec<User>, StoreError> {
            std::future::pending().await
        }
        async fn count(&self) -> Result<u64, StoreError> {
            std::future::pending().await
        }
    }

    #[actix_web::test]
    async fn test_stalled_store_times_out() {
        let config = AuthConfig {
            request_timeout: Duration::from_millis(50),
            ..test_config()
        };
        let tokens = Arc::new(TokenService::new(primary_keys(), &config.jwt));
        let auth = AuthService::new(
            Arc::new(StalledUserStore),
            Arc::new(InMemoryRefreshTokenStore::default()),
            tokens,
            &config,
        )
        .unwrap();

        let result = auth.login(EMAIL, PASSWORD, &client()).await;
        assert_eq!(result.unwrap_err(), AuthError::Timeout);
    }

    /// 로그인 부가 기록(실패 횟수 초기화, 마지막 로그인)만 실패하는 저장소
    struct FailingSideWritesStore {
        inner: InMemoryUserStore,
    }

    #[async_trait]
    impl UserStore for FailingSideWritesStore {
        async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
            self.inner.create(new_user).await
        }
        async fn get_by_id(&self, id: UserId) -> Result<User, StoreError> {
            self.inner.get_by_id(id).await
        }
        async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
            self.inner.get_by_email(email).await
        }
        async fn update(&self, id: UserId, update: UpdateUser) -> Result<User, StoreError> {
            self.inner.update(id, update).await
        }
        async fn update_password(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
            self.inner.update_password(id, hash).await
        }
        async fn mark_email_verified(&self, id: UserId) -> Result<(), StoreError> {
            self.inner.mark_email_verified(id).await
        }
        async fn update_last_login(&self, _: UserId, _: Option<&str>) -> Result<(), StoreError> {
            Err(StoreError::Database("write timed out".to_string()))
        }
        async fn increment_failed_attempts(&self, id: UserId) -> Result<i32, StoreError> {
            self.inner.increment_failed_attempts(id).await
        }
        async fn reset_failed_attempts(&self, _: UserId) -> Result<(), StoreError> {
            Err(StoreError::Database("write timed out".to_string()))
        }
        async fn lock_until(&self, id: UserId, until: DateTime) -> Result<(), StoreError> {
            self.inner.lock_until(id, until).await
        }
        async fn delete(&self, id: UserId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
        async fn list(&self, limit: i64, offset: u64) -> Result<Vec<User>, StoreError> {
            self.inner.list(limit, offset).await
        }
        async fn count(&self) -> Result<u64, StoreError> {
            self.inner.count().await
        }
    }

    #[actix_web::test]
    async fn test_failed_side_writes_do_not_block_login() {
        let config = test_config();
        let users = Arc::new(FailingSideWritesStore {
            inner: InMemoryUserStore::new(),
        });
        let tokens = Arc::new(TokenService::new(primary_keys(), &config.jwt));
        let auth = AuthService::new(
            users.clone(),
            Arc::new(InMemoryRefreshTokenStore::default()),
            tokens,
            &config,
        )
        .unwrap();
        let user = auth.register(EMAIL, PASSWORD, None).await.unwrap();

        let wrong = auth.login(EMAIL, "Wrong0rd!", &client()).await;
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidCredentials);

        let (pair, logged_in) = auth.login(EMAIL, PASSWORD, &client()).await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(auth.verify_token(&pair.access_token).await.is_ok());

        // 기록이 실패했으므로 저장된 상태는 그대로
        let stored = users.get_by_id(user.id).await.unwrap();
        assert_eq!(stored.failed_login_attempts, 1);
        assert!(stored.last_login_at.is_none());
    }
}
