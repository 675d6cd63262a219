//! # Authentication Configuration Module
//!
//! JWT 토큰, 비밀번호 정책, Argon2id 비용, 계정 잠금 정책 등
//! 인증 코어가 사용하는 모든 설정값을 관리하는 모듈입니다.
//!
//! 모든 설정은 애플리케이션 시작 시 한 번 [`AuthConfig::from_env`]로 읽혀
//! 서비스 생성자에 명시적으로 전달됩니다. 비즈니스 로직 내부에서
//! 환경 변수를 직접 조회하지 않습니다.
//!
//! ## 환경 변수 설정
//!
//! ### JWT 토큰 설정
//! ```bash
//! export JWT_ISSUER="saas-auth-core"
//! export JWT_AUDIENCE="saas-api"
//! export JWT_ACCESS_TOKEN_MINUTES="15"
//! export JWT_REFRESH_TOKEN_DAYS="7"
//! export JWT_PRIVATE_KEY_PATH="./secrets/jwt_private_key.pem"
//! export JWT_PUBLIC_KEY_PATH="./secrets/jwt_public_key.pem"
//! ```
//!
//! ### 비밀번호 정책
//! ```bash
//! export PASSWORD_MIN_LENGTH="8"
//! export PASSWORD_REQUIRE_UPPERCASE="true"
//! export PASSWORD_REQUIRE_LOWERCASE="true"
//! export PASSWORD_REQUIRE_DIGIT="true"
//! export PASSWORD_REQUIRE_SPECIAL="false"
//! ```
//!
//! ### 계정 잠금
//! ```bash
//! export AUTH_MAX_FAILED_ATTEMPTS="5"
//! export AUTH_LOCKOUT_MINUTES="15"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::AuthConfig;
//!
//! let config = AuthConfig::from_env();
//! println!("access token TTL: {}분", config.jwt.access_token_ttl.num_minutes());
//! ```

use std::env;

use chrono::Duration;

use super::{lookup_bool, lookup_duration, lookup_or, EnvLookup, Environment};

/// 액세스 토큰 수명 상한 (분)
const MAX_ACCESS_TOKEN_MINUTES: i64 = 24 * 60;
/// 리프레시 토큰 수명 및 보존 기간 상한 (일)
const MAX_REFRESH_TOKEN_DAYS: i64 = 365;
/// 잠금 지속 시간 상한 (분)
const MAX_LOCKOUT_MINUTES: i64 = 7 * 24 * 60;

/// JWT 발급/검증 설정
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// `iss` 클레임 (검증 시 정확히 일치해야 함)
    pub issuer: String,
    /// `aud` 클레임 (검증 시 포함되어야 함)
    pub audience: String,
    /// 액세스 토큰 수명
    pub access_token_ttl: Duration,
    /// 리프레시 토큰 수명
    pub refresh_token_ttl: Duration,
    /// RSA 개인키 PEM 경로 (없으면 임시 키 사용)
    pub private_key_path: Option<String>,
    /// RSA 공개키 PEM 경로
    pub public_key_path: Option<String>,
    /// JWT 헤더 및 JWKS의 `kid`
    pub key_id: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "saas-auth-core".to_string(),
            audience: "saas-api".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            private_key_path: None,
            public_key_path: None,
            key_id: "auth-key-1".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        let defaults = Self::default();

        Self {
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: lookup("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl: lookup_duration(
                lookup,
                "JWT_ACCESS_TOKEN_MINUTES",
                15,
                MAX_ACCESS_TOKEN_MINUTES,
                Duration::minutes,
            ),
            refresh_token_ttl: lookup_duration(
                lookup,
                "JWT_REFRESH_TOKEN_DAYS",
                7,
                MAX_REFRESH_TOKEN_DAYS,
                Duration::days,
            ),
            private_key_path: lookup("JWT_PRIVATE_KEY_PATH").filter(|p| !p.trim().is_empty()),
            public_key_path: lookup("JWT_PUBLIC_KEY_PATH").filter(|p| !p.trim().is_empty()),
            key_id: lookup("JWT_KEY_ID").unwrap_or(defaults.key_id),
        }
    }
}

/// 비밀번호 강도 정책
///
/// 각 문자 클래스 요구사항은 독립적으로 켜고 끌 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        }
    }
}

impl PasswordPolicyConfig {
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            min_length: lookup_or(lookup, "PASSWORD_MIN_LENGTH", 8usize).max(1),
            require_uppercase: lookup_bool(lookup, "PASSWORD_REQUIRE_UPPERCASE", true),
            require_lowercase: lookup_bool(lookup, "PASSWORD_REQUIRE_LOWERCASE", true),
            require_digit: lookup_bool(lookup, "PASSWORD_REQUIRE_DIGIT", true),
            require_special: lookup_bool(lookup, "PASSWORD_REQUIRE_SPECIAL", false),
        }
    }
}

/// Argon2id 비용 파라미터
///
/// 기본값은 OWASP 권장치 (64 MiB, 3회 반복, 2 스레드)입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// 메모리 비용 (KiB 단위)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 2,
        }
    }
}

impl HashingConfig {
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            memory_kib: lookup_or(lookup, "ARGON2_MEMORY_KIB", 64 * 1024),
            iterations: lookup_or(lookup, "ARGON2_ITERATIONS", 3),
            parallelism: lookup_or(lookup, "ARGON2_PARALLELISM", 2),
        }
    }
}

/// 로그인 실패 잠금 정책
#[derive(Debug, Clone, Copy)]
pub struct LockoutConfig {
    /// 잠금까지 허용되는 연속 실패 횟수
    pub max_failed_attempts: i32,
    /// 잠금 지속 시간
    pub lockout_duration: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(15),
        }
    }
}

impl LockoutConfig {
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            max_failed_attempts: lookup_or(lookup, "AUTH_MAX_FAILED_ATTEMPTS", 5i32).max(1),
            lockout_duration: lookup_duration(
                lookup,
                "AUTH_LOCKOUT_MINUTES",
                15,
                MAX_LOCKOUT_MINUTES,
                Duration::minutes,
            ),
        }
    }
}

/// 인증 코어 전체 설정
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub password_policy: PasswordPolicyConfig,
    pub hashing: HashingConfig,
    pub lockout: LockoutConfig,
    /// 만료/폐기된 리프레시 토큰 행을 보존하는 기간
    pub refresh_token_retention: Duration,
    /// 요청 하나가 인증 작업에 쓸 수 있는 최대 시간
    pub request_timeout: std::time::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            jwt: JwtConfig::default(),
            password_policy: PasswordPolicyConfig::default(),
            hashing: HashingConfig::default(),
            lockout: LockoutConfig::default(),
            refresh_token_retention: Duration::days(7),
            request_timeout: std::time::Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// 프로세스 환경 변수에서 전체 인증 설정을 읽습니다.
    ///
    /// 파싱할 수 없는 값은 에러 로그를 남기고 기본값으로 대체됩니다.
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// 임의의 키-값 조회 함수로부터 설정을 구성합니다.
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            environment: Environment::from_lookup(lookup),
            jwt: JwtConfig::from_lookup(lookup),
            password_policy: PasswordPolicyConfig::from_lookup(lookup),
            hashing: HashingConfig::from_lookup(lookup),
            lockout: LockoutConfig::from_lookup(lookup),
            refresh_token_retention: lookup_duration(
                lookup,
                "REFRESH_TOKEN_RETENTION_DAYS",
                7,
                MAX_REFRESH_TOKEN_DAYS,
                Duration::days,
            ),
            request_timeout: std::time::Duration::from_secs(
                lookup_or(lookup, "AUTH_REQUEST_TIMEOUT_SECS", 10u64).max(1),
            ),
        }
    }
}
