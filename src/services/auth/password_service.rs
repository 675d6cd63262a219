//! 비밀번호 정책 및 Argon2id 해싱
//!
//! 인코딩된 해시는 PHC 문자열 형식
//! (`$argon2id$v=19$m=65536,t=3,p=2$<salt>$<hash>`)으로 알고리즘, 버전,
//! 비용 파라미터, 솔트를 함께 담습니다. 검증은 문자열에 기록된 파라미터로
//! 다시 유도한 뒤 상수 시간 비교를 수행합니다.

use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::{HashingConfig, PasswordPolicyConfig};
use crate::errors::{PasswordHashError, PasswordRule};

const KEY_LENGTH: usize = 32;
const SUPPORTED_VERSION: u32 = 0x13;

/// 비밀번호 강도 정책
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    config: PasswordPolicyConfig,
}

impl PasswordPolicy {
    pub fn new(config: PasswordPolicyConfig) -> Self {
        Self { config }
    }

    /// 정책을 검사하고 처음으로 위반된 규칙을 반환합니다.
    ///
    /// 검사 순서: 길이 → 대문자 → 소문자 → 숫자 → 특수문자
    pub fn validate(&self, password: &str) -> Result<(), PasswordRule> {
        if password.chars().count() < self.config.min_length {
            return Err(PasswordRule::TooShort { min: self.config.min_length });
        }

        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_numeric());
        let has_special = password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control());

        if self.config.require_uppercase && !has_upper {
            return Err(PasswordRule::MissingUppercase);
        }
        if self.config.require_lowercase && !has_lower {
            return Err(PasswordRule::MissingLowercase);
        }
        if self.config.require_digit && !has_digit {
            return Err(PasswordRule::MissingDigit);
        }
        if self.config.require_special && !has_special {
            return Err(PasswordRule::MissingSpecial);
        }

        Ok(())
    }
}

/// Argon2id 비밀번호 해셔
///
/// 해싱은 CPU/메모리를 많이 쓰므로 비동기 컨텍스트에서는
/// `spawn_blocking` 안에서 호출해야 합니다.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 비용 파라미터를 검증하고 해셔를 생성합니다.
    pub fn new(config: HashingConfig) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| PasswordHashError::Hashing(format!("잘못된 Argon2 파라미터: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 16바이트 랜덤 솔트로 해시하고 PHC 문자열을 반환합니다.
    pub fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordHashError::Hashing(e.to_string()))
    }

    /// 비밀번호가 인코딩된 해시와 일치하는지 확인합니다.
    ///
    /// 형식 오류, 지원하지 않는 알고리즘/버전, 누락되거나 잘못된 파라미터는
    /// 불일치(`Ok(false)`)가 아니라 `Decode` 에러입니다.
    pub fn verify(&self, password: &str, encoded_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(encoded_hash)
            .map_err(|e| PasswordHashError::Decode(e.to_string()))?;

        if parsed.algorithm != argon2::ARGON2ID_IDENT {
            return Err(PasswordHashError::Decode(format!(
                "지원하지 않는 알고리즘: {}",
                parsed.algorithm
            )));
        }
        if parsed.version != Some(SUPPORTED_VERSION) {
            return Err(PasswordHashError::Decode("호환되지 않는 Argon2 버전".to_string()));
        }
        for name in ["m", "t", "p"] {
            if parsed.params.get_decimal(name).is_none() {
                return Err(PasswordHashError::Decode(format!("파라미터 `{}` 누락 또는 손상", name)));
            }
        }
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(PasswordHashError::Decode("솔트 또는 해시 누락".to_string()));
        }

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordHashError::Decode(e.to_string())),
        }
    }
}
