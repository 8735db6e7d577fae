//! acf-sql: ACL 기반 쿼리 필터
//!
//! 엔티티 쿼리에 ACL 필터를 붙이고 최종 SQL을 생성합니다.
//! SQL 구조는 SeaQuery로 만들며, 클래스 이름과 보안 식별자는
//! 플랫폼 규칙으로 이스케이프된 리터럴로만 삽입됩니다.
//!
//! # 모듈 구조
//!
//! - `query`, `builder`: 엔티티 쿼리 모델과 빌더
//! - `alias`: 쿼리 별칭 → 엔티티 해석
//! - `filter`: ACL 필터 서브쿼리 컴파일
//! - `acl`: 필터 적용 (`AclFilter::apply`)
//! - `walker`: 필터 메타데이터를 읽어 SQL을 생성하는 출력 워커
//! - `report`: 직접 부여된 권한 조회 (`AclQuery::query_acl`)
//! - `platform`: MySQL / PostgreSQL / SQLite 어댑터

pub mod acl;
pub mod alias;
pub mod builder;
pub mod error;
pub mod filter;
pub mod platform;
pub mod query;
pub mod report;
pub mod walker;

#[cfg(test)]
mod testing;

pub use acl::AclFilter;
pub use alias::{AliasResolver, ResolvedAlias};
pub use builder::QueryBuilder;
pub use error::{Error, Result};
pub use filter::AclFilterCompiler;
pub use platform::{platform_for, AclPlatform, MySqlPlatform, PostgresPlatform, SqlitePlatform};
pub use query::{AclFilterMetadata, NativeQuery, OutputWalkerKind, Query, QueryHints, QuerySource};
pub use report::{AclGrant, AclQuery, AclStore};
pub use walker::{AclWalker, OutputWalker, SqlWalker};
