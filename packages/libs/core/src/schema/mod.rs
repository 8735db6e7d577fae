//! 엔티티 메타데이터
//!
//! # 개요
//!
//! 쿼리에 등장하는 엔티티 클래스를 테이블, 단일 식별자 컬럼,
//! 매핑된 하위 클래스, 연관관계로 해석합니다.
//! ACL 저장소는 구체 클래스 이름으로 색인되므로 필터는 하위 클래스까지 포함합니다.
//!
//! # 모듈 구조
//!
//! - `entity`: 엔티티 메타데이터 정의
//! - `registry`: 클래스 이름 → 메타데이터 조회
//! - `parser`: 메타데이터 YAML 파싱

mod entity;
mod parser;
mod registry;

pub use entity::{Association, EntityMetadata, IdColumn};
pub use parser::MetadataParser;
pub use registry::{AssociationError, MetadataRegistry};
