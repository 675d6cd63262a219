//! 인증 코어 메인 애플리케이션
//!
//! 설정을 읽어 저장소와 서비스를 구성하고 Actix-web HTTP 서버를 구동합니다.

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use saas_auth_core::config::{
    AuthConfig, DatabaseConfig, RateLimitConfig, ServerConfig, StorageBackend,
};
use saas_auth_core::db::Database;
use saas_auth_core::repositories::{
    InMemoryRefreshTokenStore, InMemoryUserStore, RefreshTokenRepository, RefreshTokenStore,
    UserRepository, UserStore,
};
use saas_auth_core::routes::configure_all_routes;
use saas_auth_core::services::auth::{AuthProvider, AuthService, RsaKeyPair, TokenService};
use saas_auth_core::services::users::UserService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 인증 서비스 시작중...");

    let server_config = ServerConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let (users, refresh_tokens) = initialize_stores(&auth_config).await?;

    let keys = RsaKeyPair::load_or_generate(&auth_config.jwt, auth_config.environment)
        .map_err(|e| io::Error::other(format!("서명 키 로드 실패: {}", e)))?;
    let tokens = Arc::new(TokenService::new(keys, &auth_config.jwt));

    let auth_service = AuthService::new(users.clone(), refresh_tokens.clone(), tokens.clone(), &auth_config)
        .map_err(|e| io::Error::other(format!("인증 서비스 초기화 실패: {}", e)))?;
    let auth: Arc<dyn AuthProvider> = Arc::new(auth_service);
    let user_service = Arc::new(UserService::new(users, refresh_tokens));

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    start_http_server(server_config, auth, user_service, tokens).await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// Rate limiting, CORS, 로깅, 경로 정규화 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패, 잘못된 rate limit 설정, 서버 실행 오류
async fn start_http_server(
    server_config: ServerConfig,
    auth: Arc<dyn AuthProvider>,
    user_service: Arc<UserService>,
    tokens: Arc<TokenService>,
) -> io::Result<()> {
    let bind_address = server_config.bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 JWKS: http://{}/.well-known/jwks.json", bind_address);

    let rate_limit = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit.per_second)
        .burst_size(rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other(format!("잘못된 Rate Limiting 설정: {:?}", rate_limit)))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit.per_second, rate_limit.burst_size
    );

    HttpServer::new(move || {
        // CORS 설정
        let cors = configure_cors();
        let auth = auth.clone();

        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())

            // 공유 서비스
            .app_data(web::Data::from(auth.clone()))
            .app_data(web::Data::from(user_service.clone()))
            .app_data(web::Data::from(tokens.clone()))

            // 라우트 설정
            .configure(|cfg| configure_all_routes(cfg, auth))
    })
        .bind(bind_address)?
        .workers(server_config.workers)
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    // 로거 초기화 전이므로 stderr로 직접 출력
    let result = match profile.as_str() {
        "prod" => dotenv::from_filename(".env.prod").map(|_| ()),
        "dev" => dotenv::from_filename(".env.dev").map(|_| ()),
        _ => dotenv().map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("[{}] 환경 파일 로드 실패: {}", profile, e);
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=debug")
///
/// ```bash
/// RUST_LOG=saas_auth_core::services=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// `AUTH_STORAGE`에 따라 사용자/리프레시 토큰 저장소를 구성합니다
///
/// MongoDB를 사용하는 경우 연결 확인 후 인덱스를 생성합니다.
async fn initialize_stores(
    auth_config: &AuthConfig,
) -> io::Result<(Arc<dyn UserStore>, Arc<dyn RefreshTokenStore>)> {
    let backend = StorageBackend::from_lookup(&|key: &str| std::env::var(key).ok());

    match backend {
        StorageBackend::Memory => {
            if !auth_config.environment.allows_ephemeral_keys() {
                warn!("⚠️ 프로덕션 환경에서 메모리 저장소를 사용합니다. 재시작 시 모든 계정이 사라집니다");
            }
            info!("🧠 메모리 저장소 사용");

            Ok((
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryRefreshTokenStore::new(auth_config.refresh_token_retention)),
            ))
        }
        StorageBackend::MongoDb => {
            info!("📡 데이터베이스 연결 중...");

            let database = Database::connect(&DatabaseConfig::from_env())
                .await
                .map_err(|e| {
                    error!("MongoDB 연결 실패: {}", e);
                    io::Error::other(e.to_string())
                })?;

            let users = UserRepository::new(&database);
            let refresh_tokens = RefreshTokenRepository::new(&database, auth_config.refresh_token_retention);

            users.create_indexes().await.map_err(|e| io::Error::other(e.to_string()))?;
            refresh_tokens.create_indexes().await.map_err(|e| io::Error::other(e.to_string()))?;

            Ok((Arc::new(users), Arc::new(refresh_tokens)))
        }
    }
}

/// CORS 설정을 구성합니다
///
/// # Allowed Origins
///
/// * `http://localhost:3000` - 프론트엔드 개발 서버
/// * `http://localhost:8080` - 자체 서버
/// * `127.0.0.1` 동등한 주소들
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        // 리프레시 토큰 쿠키
        .supports_credentials()
        .max_age(3600)
}
