//! 권한 마스크 및 Role 계층 해석
//!
//! # 개요
//!
//! 요청된 권한 이름(VIEW, EDIT, ...)을 하나의 비트마스크로 합치고,
//! 설정된 Role 계층을 따라 상위 Role을 전개합니다.
//!
//! # 모듈 구조
//!
//! - `mask`: 권한 이름 → 비트 값 정적 테이블, 마스크 빌더
//! - `hierarchy`: Role 계층 (순환 안전 전개)

mod hierarchy;
mod mask;

pub use hierarchy::RoleHierarchy;
pub use mask::{MaskBuilder, Permission, PermissionMask};
