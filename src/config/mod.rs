//! # Configuration Module
//!
//! 인증 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 시작 시점에 한 번 읽어 구조체로 만들고,
//! 이후에는 생성자 인자로만 전달합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, 서버, 저장소 관련 설정
//! - [`auth_config`] - JWT, 비밀번호 정책, 해싱, 잠금 관련 설정
//!
//! ## 설계 원칙
//!
//! ### 1. 환경 분리 (Environment Separation)
//!
//! 개발, 테스트, 스테이징, 프로덕션 환경별로 다른 기본값을 제공합니다.
//!
//! ### 2. 보안 우선 (Security First)
//!
//! - 서명 키는 파일 경로로만 제공
//! - 프로덕션에서는 임시 키 생성 금지
//!
//! ### 3. 실패하지 않는 파싱
//!
//! - 잘못된 값은 에러 로그 후 기본값 사용
//! - 설정 로딩 중 패닉 없음
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{AuthConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let auth = AuthConfig::from_env();
//! println!("{} 에서 실행, 환경: {:?}", server.bind_address(), auth.environment);
//! ```

use std::fmt::Display;
use std::str::FromStr;

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;

/// 설정 키로 값을 조회하는 함수 타입
///
/// 운영에서는 `std::env::var`, 테스트에서는 `HashMap` 기반 클로저를 사용합니다.
pub type EnvLookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// 키를 조회해 `T`로 파싱하고, 없거나 파싱에 실패하면 기본값을 반환합니다.
pub(crate) fn lookup_or<T>(lookup: &EnvLookup<'_>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|e| {
            log::error!("{} 파싱 실패: {}. 기본값 {} 사용", key, e, default);
            default
        }),
        None => default,
    }
}

/// 양의 정수 설정값을 `chrono::Duration`으로 읽습니다.
///
/// `1..=max` 범위를 벗어난 값은 에러 로그 후 기본값으로 대체되므로
/// `unit` 생성자가 범위 초과로 패닉하지 않습니다.
pub(crate) fn lookup_duration(
    lookup: &EnvLookup<'_>,
    key: &str,
    default: i64,
    max: i64,
    unit: fn(i64) -> chrono::Duration,
) -> chrono::Duration {
    let value = lookup_or(lookup, key, default);
    if (1..=max).contains(&value) {
        unit(value)
    } else {
        log::error!("{} 값 {} 이(가) 허용 범위 1..={} 밖입니다. 기본값 {} 사용", key, value, max, default);
        unit(default)
    }
}

/// 불리언 설정값을 읽습니다. `true/false`, `1/0`, `yes/no`, `on/off`를 허용합니다.
pub(crate) fn lookup_bool(lookup: &EnvLookup<'_>, key: &str, default: bool) -> bool {
    match lookup(key).map(|raw| raw.trim().to_lowercase()) {
        Some(value) => match value.as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                log::error!("{} 파싱 실패: {}. 기본값 {} 사용", key, value, default);
                default
            }
        },
        None => default,
    }
}
