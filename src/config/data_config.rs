//! 데이터 및 서버 설정 관리 모듈
//!
//! 실행 환경, 서버 바인딩, 저장소 백엔드 관련 설정을 관리합니다.

use std::env;
use std::str::FromStr;

use super::{lookup_or, EnvLookup};

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 최고 수준의 보안 및 성능
    Production,
}

impl Environment {
    /// 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let env = Environment::from_lookup(&|key: &str| std::env::var(key).ok());
    /// if env.allows_ephemeral_keys() {
    ///     println!("임시 서명 키 허용");
    /// }
    /// ```
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        lookup("ENVIRONMENT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(Environment::Production)
    }

    /// 서명 키를 프로세스 내에서 임시 생성해도 되는 환경인지 확인합니다.
    ///
    /// 프로덕션에서는 재시작마다 키가 바뀌면 발급된 모든 토큰이 무효화되므로
    /// 반드시 키 파일을 사용해야 합니다.
    pub fn allows_ephemeral_keys(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    /// 알 수 없는 값은 `Production`으로 취급합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        })
    }
}

/// 사용자/리프레시 토큰 저장소 백엔드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB 컬렉션 (운영 기본값)
    MongoDb,
    /// 프로세스 메모리 (로컬 개발 전용, 재시작 시 초기화)
    Memory,
}

impl StorageBackend {
    /// `AUTH_STORAGE` 환경 변수에서 백엔드를 결정합니다.
    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        match lookup("AUTH_STORAGE").as_deref().map(str::trim) {
            Some("memory") | Some("in-memory") => StorageBackend::Memory,
            Some("mongodb") | Some("mongo") | None => StorageBackend::MongoDb,
            Some(other) => {
                log::error!("알 수 없는 AUTH_STORAGE 값: {}. mongodb 사용", other);
                StorageBackend::MongoDb
            }
        }
    }
}

/// 서버 바인딩 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    /// 환경 변수에서 서버 설정을 읽습니다.
    ///
    /// # Environment Variables
    ///
    /// - `HOST`: 바인딩 주소 (기본값: 127.0.0.1)
    /// - `PORT`: 포트 (기본값: 8080)
    /// - `SERVER_WORKERS`: 워커 스레드 수 (기본값: 4)
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup_or(lookup, "PORT", 8080),
            workers: lookup_or(lookup, "SERVER_WORKERS", 4),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 요청 속도 제한 (`actix-governor`)
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// # Environment Variables
    ///
    /// - `RATE_LIMIT_PER_SECOND`: 초당 허용 요청 수 (기본값: 100)
    /// - `RATE_LIMIT_BURST_SIZE`: 버스트 허용량 (기본값: 200)
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            per_second: lookup_or(lookup, "RATE_LIMIT_PER_SECOND", 100),
            burst_size: lookup_or(lookup, "RATE_LIMIT_BURST_SIZE", 200),
        }
    }
}

/// MongoDB 연결 설정
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database_name: String,
}

impl DatabaseConfig {
    /// # Environment Variables
    ///
    /// - `MONGODB_URI`: 기본값 `mongodb://localhost:27017`
    /// - `DATABASE_NAME`: 기본값 `saas_auth_dev`
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &EnvLookup<'_>) -> Self {
        Self {
            uri: lookup("MONGODB_URI").unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "saas_auth_dev".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_environment_from_string() {
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("unknown".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_ephemeral_keys_only_outside_production() {
        assert!(Environment::Development.allows_ephemeral_keys());
        assert!(Environment::Staging.allows_ephemeral_keys());
        assert!(!Environment::Production.allows_ephemeral_keys());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(&lookup_from(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.workers, 4);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = ServerConfig::from_lookup(&lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_rate_limit_config() {
        let config = RateLimitConfig::from_lookup(&lookup_from(&[("RATE_LIMIT_PER_SECOND", "20")]));
        assert_eq!(config.per_second, 20);
        assert_eq!(config.burst_size, 200);

        let config = RateLimitConfig::from_lookup(&lookup_from(&[("RATE_LIMIT_BURST_SIZE", "-1")]));
        assert_eq!(config.burst_size, 200);
    }

    #[test]
    fn test_storage_backend_selection() {
        assert_eq!(
            StorageBackend::from_lookup(&lookup_from(&[("AUTH_STORAGE", "memory")])),
            StorageBackend::Memory
        );
        assert_eq!(StorageBackend::from_lookup(&lookup_from(&[])), StorageBackend::MongoDb);
        assert_eq!(
            StorageBackend::from_lookup(&lookup_from(&[("AUTH_STORAGE", "sqlite")])),
            StorageBackend::MongoDb
        );
    }
}
