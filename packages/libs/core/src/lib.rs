//! acf-core: ACL 필터 공통 핵심 라이브러리
//!
//! 이 크레이트는 쿼리 필터(acf-sql)가 공유하는 핵심 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `config`: ACL 설정 (YAML) 로드 및 검증
//! - `permissions`: 권한 마스크, Role 계층 해석
//! - `identity`: 인증 주체와 보안 식별자(Security Identifier) 추출
//! - `schema`: 엔티티 메타데이터 (클래스 → 테이블/식별자/연관관계)
//! - `error`: 공통 에러 타입

pub mod config;
pub mod error;
pub mod identity;
pub mod permissions;
pub mod schema;

pub use config::{AclConfig, AclTables, MaskComparison, PlatformKind};
pub use error::{Error, Result};
