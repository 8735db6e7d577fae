//! 엔티티 쿼리 모델
//!
//! 호스트 쿼리 계층의 최소 표현입니다.
//!
//! - [`SelectAst`]: FROM 루트 선언, 조인 선언, 조건, 정렬
//! - [`Query`]: AST + 바인딩 파라미터 + 힌트(ACL 필터 메타데이터)
//! - [`NativeQuery`]: 원시 SQL. AST가 없으므로 ACL 필터를 붙일 수 없습니다.
//!
//! ACL 필터 메타데이터는 생산자([`AclFilter`](crate::AclFilter))와
//! 소비자([`AclWalker`](crate::walker::AclWalker)) 사이의 타입 있는 계약입니다.
//! 한 번 붙은 항목은 쿼리 수명 동안 제거되지 않습니다.

use std::collections::BTreeMap;

use acf_core::schema::MetadataRegistry;
use serde_json::Value;

use crate::error::Result;
use crate::platform::AclPlatform;
use crate::walker::{AclWalker, OutputWalker, SqlWalker};

/// 바인딩 파라미터 (이름 → 값)
pub type Parameters = BTreeMap<String, Value>;

/// SELECT 구문 트리
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectAst {
    pub from: FromClause,
    pub conditions: Vec<Predicate>,
    pub order_by: Vec<OrderItem>,
}

/// FROM 절
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromClause {
    pub declarations: Vec<IdentificationVariableDeclaration>,
}

/// 루트 엔티티 선언과 그에 딸린 조인들
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationVariableDeclaration {
    pub range: RangeVariableDeclaration,
    pub joins: Vec<JoinAssociationDeclaration>,
}

/// 루트 엔티티 (`App\Entity\Document d`)
#[derive(Debug, Clone, PartialEq)]
pub struct RangeVariableDeclaration {
    /// 엔티티 클래스 이름
    pub abstract_schema_name: String,
    /// 쿼리 내 별칭
    pub alias: String,
}

/// 연관관계 조인 (`JOIN d.owner o`)
#[derive(Debug, Clone, PartialEq)]
pub struct JoinAssociationDeclaration {
    pub kind: JoinKind,
    /// 조인을 선언한 쪽 별칭 (`d`)
    pub parent_alias: String,
    /// 연관관계 필드 (`owner`)
    pub association_field: String,
    /// 조인 대상 별칭 (`o`)
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// `alias.column = :parameter` 조건
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub alias: String,
    pub column: String,
    pub parameter: String,
}

/// 정렬 항목
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub alias: String,
    pub column: String,
    pub descending: bool,
}

/// ACL 필터 메타데이터
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclFilterMetadata {
    /// 허용된 객체 식별자를 돌려주는 서브쿼리 SQL
    pub filter_sql: String,
    /// 플랫폼 인용된 테이블 이름
    pub table: String,
    /// 필터를 적용할 쿼리 별칭
    pub alias: String,
    /// 식별자 컬럼 이름
    pub identifier_column: String,
}

/// 커스텀 SQL 출력 워커 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputWalkerKind {
    Acl,
}

/// 쿼리 힌트
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryHints {
    acl: Vec<AclFilterMetadata>,
    output_walker: Option<OutputWalkerKind>,
}

impl QueryHints {
    /// 누적된 ACL 필터 (적용 순서)
    pub fn acl_filters(&self) -> &[AclFilterMetadata] {
        &self.acl
    }

    /// 요구되는 출력 워커
    pub fn output_walker(&self) -> Option<OutputWalkerKind> {
        self.output_walker
    }

    pub(crate) fn push_acl_filter(&mut self, metadata: AclFilterMetadata) {
        self.acl.push(metadata);
    }

    pub(crate) fn set_output_walker(&mut self, walker: OutputWalkerKind) {
        self.output_walker = Some(walker);
    }
}

/// 실행 가능한 엔티티 쿼리
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    ast: SelectAst,
    parameters: Parameters,
    hints: QueryHints,
    first_result: Option<u64>,
    max_results: Option<u64>,
}

impl Query {
    pub(crate) fn new(
        ast: SelectAst,
        parameters: Parameters,
        first_result: Option<u64>,
        max_results: Option<u64>,
    ) -> Self {
        Self {
            ast,
            parameters,
            hints: QueryHints::default(),
            first_result,
            max_results,
        }
    }

    pub fn ast(&self) -> &SelectAst {
        &self.ast
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// 파라미터 설정 (같은 이름이면 교체)
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn hints(&self) -> &QueryHints {
        &self.hints
    }

    pub(crate) fn hints_mut(&mut self) -> &mut QueryHints {
        &mut self.hints
    }

    pub fn first_result(&self) -> Option<u64> {
        self.first_result
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    /// 최종 SQL 생성
    ///
    /// 힌트에 ACL 워커가 지정되어 있으면 [`AclWalker`]가, 아니면 [`SqlWalker`]가 사용됩니다.
    pub fn to_sql(&self, registry: &MetadataRegistry, platform: &dyn AclPlatform) -> Result<String> {
        let select = match self.hints.output_walker {
            Some(OutputWalkerKind::Acl) => AclWalker::new(registry).walk_select_statement(self)?,
            None => SqlWalker::new(registry).walk_select_statement(self)?,
        };
        Ok(platform.render_select(&select))
    }
}

/// 원시 SQL 쿼리
#[derive(Debug, Clone, PartialEq)]
pub struct NativeQuery {
    pub sql: String,
    pub parameters: Parameters,
}

impl NativeQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Parameters::new(),
        }
    }
}

/// 필터 적용 대상 쿼리
///
/// 빌더와 컴파일된 쿼리는 AST를 가지므로 필터를 붙일 수 있고,
/// 원시 SQL은 지원하지 않습니다.
#[derive(Debug, Clone, Copy)]
pub enum QuerySource<'a> {
    Builder(&'a crate::builder::QueryBuilder),
    Query(&'a Query),
    Native(&'a NativeQuery),
}

impl<'a> QuerySource<'a> {
    /// 복사 가능한 정규 형태로 변환 (바인딩 파라미터 보존)
    pub fn to_query(&self) -> acf_core::Result<Query> {
        let query = match self {
            QuerySource::Builder(builder) => builder.get_query(),
            QuerySource::Query(query) => (*query).clone(),
            QuerySource::Native(_) => {
                return Err(acf_core::Error::InvalidQueryShape {
                    kind: "native SQL query has no entity AST".to_string(),
                })
            }
        };

        if query.ast.from.declarations.is_empty() {
            return Err(acf_core::Error::InvalidQueryShape {
                kind: "query has no FROM clause".to_string(),
            });
        }

        Ok(query)
    }
}

impl<'a> From<&'a crate::builder::QueryBuilder> for QuerySource<'a> {
    fn from(builder: &'a crate::builder::QueryBuilder) -> Self {
        QuerySource::Builder(builder)
    }
}

impl<'a> From<&'a Query> for QuerySource<'a> {
    fn from(query: &'a Query) -> Self {
        QuerySource::Query(query)
    }
}

impl<'a> From<&'a NativeQuery> for QuerySource<'a> {
    fn from(query: &'a NativeQuery) -> Self {
        QuerySource::Native(query)
    }
}
