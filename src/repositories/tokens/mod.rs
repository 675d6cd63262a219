//! 리프레시 토큰 저장소

pub mod refresh_token_store;
pub mod token_repository;
pub mod memory;

pub use refresh_token_store::RefreshTokenStore;
pub use token_repository::RefreshTokenRepository;
pub use memory::InMemoryRefreshTokenStore;
