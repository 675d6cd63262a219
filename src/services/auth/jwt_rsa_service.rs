//! RSA 서명 키 관리
//!
//! RS256 JWT 서명에 사용하는 RSA 키 쌍을 로드/생성하고 JWKS로 공개합니다.
//! JWT 인코딩/디코딩 키는 로드 시점에 한 번만 만들어 재사용합니다.
//!
//! ## 키 공급 규칙
//!
//! | 경로 설정 | 파일 존재 | 개발/테스트 | 프로덕션 |
//! |-----------|-----------|-------------|----------|
//! | 둘 다 있음 | 있음 | 파일 로드 | 파일 로드 |
//! | 둘 다 있음 | 없음 | 생성 후 저장 | 에러 |
//! | 없음 | - | 임시 키 생성 (메모리) | 에러 |

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

use crate::config::{Environment, JwtConfig};

const RSA_KEY_BITS: usize = 2048;

/// 서명 키 로드/생성 에러
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("키 파일 입출력 실패 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("개인키 PEM 파싱 실패: {0}")]
    InvalidPrivateKey(String),

    #[error("공개키 PEM 파싱 실패: {0}")]
    InvalidPublicKey(String),

    #[error("공개키가 개인키와 일치하지 않습니다")]
    Mismatch,

    #[error("RSA 키 생성 실패: {0}")]
    Generation(String),

    #[error("프로덕션 환경에서는 JWT_PRIVATE_KEY_PATH와 JWT_PUBLIC_KEY_PATH가 모두 필요합니다")]
    MissingKeyPaths,

    #[error("프로덕션 환경에서 키 파일을 찾을 수 없습니다: {0}")]
    MissingKeyFiles(String),

    #[error("JWT 키 변환 실패: {0}")]
    Encoding(String),
}

/// RS256 서명용 RSA 키 쌍
///
/// 개인키는 [`EncodingKey`] 형태로만 보관됩니다.
pub struct RsaKeyPair {
    key_id: String,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl RsaKeyPair {
    /// 설정과 실행 환경에 따라 키를 로드하거나 생성합니다.
    pub fn load_or_generate(config: &JwtConfig, environment: Environment) -> Result<Self, KeyError> {
        match (&config.private_key_path, &config.public_key_path) {
            (Some(private_path), Some(public_path)) => {
                let files_exist = Path::new(private_path).exists() && Path::new(public_path).exists();

                if files_exist {
                    log::info!("🔑 JWT RSA 키 로드: {}", private_path);
                    let private_pem = read_pem(private_path)?;
                    let public_pem = read_pem(public_path)?;
                    return Self::from_pem(&private_pem, &public_pem, &config.key_id);
                }

                if !environment.allows_ephemeral_keys() {
                    return Err(KeyError::MissingKeyFiles(private_path.clone()));
                }

                log::info!("🔑 JWT 키 파일이 없습니다. 새 RSA 키 쌍을 생성합니다...");
                let private_key = generate_private_key()?;
                persist_keys(&private_key, private_path, public_path)?;
                log::info!("✅ JWT RSA 키 생성 완료");
                Self::from_keys(private_key, &config.key_id)
            }
            _ => {
                if !environment.allows_ephemeral_keys() {
                    return Err(KeyError::MissingKeyPaths);
                }

                log::warn!("⚠️ JWT 키 경로가 설정되지 않아 임시 키를 사용합니다. 재시작하면 기존 토큰은 무효가 됩니다");
                Self::generate(&config.key_id)
            }
        }
    }

    /// PEM 문자열에서 키 쌍을 구성합니다.
    ///
    /// 개인키는 PKCS#1, PKCS#8 순으로, 공개키는 SPKI, PKCS#1 순으로 시도합니다.
    pub fn from_pem(private_pem: &str, public_pem: &str, key_id: &str) -> Result<Self, KeyError> {
        let private_key = RsaPrivateKey::from_pkcs1_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(private_pem))
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;

        let public_key = RsaPublicKey::from_public_key_pem(public_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_pem))
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

        if private_key.to_public_key() != public_key {
            return Err(KeyError::Mismatch);
        }

        Self::from_keys(private_key, key_id)
    }

    /// 메모리에만 존재하는 새 키 쌍을 생성합니다.
    pub fn generate(key_id: &str) -> Result<Self, KeyError> {
        Self::from_keys(generate_private_key()?, key_id)
    }

    fn from_keys(private_key: RsaPrivateKey, key_id: &str) -> Result<Self, KeyError> {
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encoding(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| KeyError::Encoding(e.to_string()))?;

        let (n, e) = public_components(&public_key);
        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| KeyError::Encoding(e.to_string()))?;

        Ok(Self {
            key_id: key_id.to_string(),
            public_key,
            encoding_key,
            decoding_key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// 검증 전용 프로세스에 배포할 JWKS 문서
    pub fn jwks(&self) -> serde_json::Value {
        let (n, e) = public_components(&self.public_key);

        serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "kid": self.key_id,
                "n": n,
                "e": e,
                "alg": "RS256"
            }]
        })
    }
}

/// base64url 인코딩된 (modulus, exponent)
fn public_components(public_key: &RsaPublicKey) -> (String, String) {
    let n = general_purpose::URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e = general_purpose::URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
    (n, e)
}

fn generate_private_key() -> Result<RsaPrivateKey, KeyError> {
    RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS).map_err(|e| KeyError::Generation(e.to_string()))
}

fn read_pem(path: &str) -> Result<String, KeyError> {
    fs::read_to_string(path).map_err(|source| KeyError::Io {
        path: path.to_string(),
        source,
    })
}

fn write_file(path: &str, contents: &[u8]) -> Result<(), KeyError> {
    fs::write(path, contents).map_err(|source| KeyError::Io {
        path: path.to_string(),
        source,
    })
}

/// 개인키는 PKCS#1, 공개키는 SPKI PEM으로 저장합니다.
fn persist_keys(private_key: &RsaPrivateKey, private_path: &str, public_path: &str) -> Result<(), KeyError> {
    for path in [private_path, public_path] {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent).map_err(|source| KeyError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| KeyError::Encoding(e.to_string()))?;
    write_file(private_path, private_pem.as_bytes())?;

    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::Encoding(e.to_string()))?;
    write_file(public_path, public_pem.as_bytes())?;

    // 파일 권한 설정 (Unix 계열 시스템에서만)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        for (path, mode) in [(private_path, 0o600), (public_path, 0o644)] {
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| KeyError::Io {
                path: path.to_string(),
                source,
            })?;
        }
    }

    log::info!("📁 Private key saved: {}", private_path);
    log::info!("📁 Public key saved: {}", public_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY_PRIVATE: &str = include_str!("testdata/primary_private.pem");
    const PRIMARY_PUBLIC: &str = include_str!("testdata/primary_public.pem");
    const SECONDARY_PRIVATE: &str = include_str!("testdata/secondary_private.pem");
    const SECONDARY_PUBLIC: &str = include_str!("testdata/secondary_public.pem");

    fn jwt_config(private: Option<String>, public: Option<String>) -> JwtConfig {
        JwtConfig {
            private_key_path: private,
            public_key_path: public,
            ..JwtConfig::default()
        }
    }

    #[test]
    fn test_loads_pkcs1_and_pkcs8_private_keys() {
        assert!(RsaKeyPair::from_pem(PRIMARY_PRIVATE, PRIMARY_PUBLIC, "k1").is_ok());
        assert!(RsaKeyPair::from_pem(SECONDARY_PRIVATE, SECONDARY_PUBLIC, "k2").is_ok());
    }

    #[test]
    fn test_mismatched_pair_is_rejected() {
        let result = RsaKeyPair::from_pem(PRIMARY_PRIVATE, SECONDARY_PUBLIC, "k1");
        assert!(matches!(result, Err(KeyError::Mismatch)));
    }

    #[test]
    fn test_garbage_pem_is_rejected() {
        let result = RsaKeyPair::from_pem("not a key", PRIMARY_PUBLIC, "k1");
        assert!(matches!(result, Err(KeyError::InvalidPrivateKey(_))));
    }

    #[test]
    fn test_jwks_publishes_public_components() {
        let keys = RsaKeyPair::from_pem(PRIMARY_PRIVATE, PRIMARY_PUBLIC, "auth-key-1").unwrap();
        let jwks = keys.jwks();
        let key = &jwks["keys"][0];

        assert_eq!(key["kty"], "RSA");
        assert_eq!(key["kid"], "auth-key-1");
        assert_eq!(key["alg"], "RS256");
        assert_eq!(key["e"], "AQAB");
        assert!(key["n"].as_str().unwrap().len() > 300);
    }

    #[test]
    fn test_production_requires_key_paths() {
        let result = RsaKeyPair::load_or_generate(&jwt_config(None, None), Environment::Production);
        assert!(matches!(result, Err(KeyError::MissingKeyPaths)));
    }

    #[test]
    fn test_production_requires_existing_files() {
        let config = jwt_config(
            Some("/nonexistent/jwt_private.pem".to_string()),
            Some("/nonexistent/jwt_public.pem".to_string()),
        );
        let result = RsaKeyPair::load_or_generate(&config, Environment::Production);
        assert!(matches!(result, Err(KeyError::MissingKeyFiles(_))));
    }

    #[test]
    fn test_loads_configured_files() {
        let dir = std::env::temp_dir().join(format!("jwt-keys-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let private_path = dir.join("private.pem");
        let public_path = dir.join("public.pem");
        fs::write(&private_path, PRIMARY_PRIVATE).unwrap();
        fs::write(&public_path, PRIMARY_PUBLIC).unwrap();

        let config = jwt_config(
            Some(private_path.display().to_string()),
            Some(public_path.display().to_string()),
        );
        let keys = RsaKeyPair::load_or_generate(&config, Environment::Production).unwrap();
        assert_eq!(keys.key_id(), "auth-key-1");

        fs::remove_dir_all(&dir).unwrap();
    }
}
