//! # User Data Transfer Objects Module
//!
//! 사용자/인증 API의 요청/응답 데이터 구조를 정의하는 모듈입니다.
//!
//! ## 모듈 구조
//!
//! ```text
//! users/
//! ├── request/
//! │   ├── auth_request.rs    # 회원가입, 로그인, 비밀번호 변경
//! │   └── admin_request.rs   # 관리자용 사용자 조회/수정
//! └── response/
//!     └── user_response.rs   # 사용자 정보, 로그인 응답
//! ```
//!
//! 응답 DTO는 비밀번호 해시, 실패 횟수, 잠금 시각 같은 내부 필드를 노출하지 않습니다.

pub mod request;
pub mod response;

// Re-exports for convenience
pub use request::*;
pub use response::*;
