//! 엔티티 쿼리 빌더
//!
//! 엔티티 클래스와 별칭, 연관관계 경로(`d.owner`)로 [`Query`]를 조립합니다.
//! 빌더 자체는 매핑을 검증하지 않으며, 조인 경로는 SQL 생성 시점에 해석됩니다.

use serde_json::Value;

use crate::query::{
    FromClause, IdentificationVariableDeclaration, JoinAssociationDeclaration, JoinKind, OrderItem,
    Parameters, Predicate, Query, RangeVariableDeclaration, SelectAst,
};

/// SELECT 쿼리 빌더
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    declarations: Vec<IdentificationVariableDeclaration>,
    conditions: Vec<Predicate>,
    order_by: Vec<OrderItem>,
    parameters: Parameters,
    first_result: Option<u64>,
    max_results: Option<u64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// FROM 루트 추가
    ///
    /// 여러 번 호출하면 루트가 여러 개인 쿼리가 됩니다.
    pub fn from(mut self, class: impl Into<String>, alias: impl Into<String>) -> Self {
        self.declarations.push(IdentificationVariableDeclaration {
            range: RangeVariableDeclaration {
                abstract_schema_name: class.into(),
                alias: alias.into(),
            },
            joins: Vec::new(),
        });
        self
    }

    /// INNER JOIN (`join("d.owner", "o")`)
    pub fn join(self, path: &str, alias: impl Into<String>) -> Self {
        self.add_join(JoinKind::Inner, path, alias.into())
    }

    /// LEFT JOIN
    pub fn left_join(self, path: &str, alias: impl Into<String>) -> Self {
        self.add_join(JoinKind::Left, path, alias.into())
    }

    /// `alias.column = :parameter` 조건 추가 (AND)
    pub fn where_eq(mut self, path: &str, parameter: impl Into<String>) -> Self {
        let (alias, column) = self.split_path(path);
        self.conditions.push(Predicate {
            alias,
            column,
            parameter: parameter.into(),
        });
        self
    }

    pub fn order_by(mut self, path: &str, descending: bool) -> Self {
        let (alias, column) = self.split_path(path);
        self.order_by.push(OrderItem {
            alias,
            column,
            descending,
        });
        self
    }

    pub fn set_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn set_first_result(mut self, offset: u64) -> Self {
        self.first_result = Some(offset);
        self
    }

    pub fn set_max_results(mut self, limit: u64) -> Self {
        self.max_results = Some(limit);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// 컴파일된 쿼리 생성
    ///
    /// 빌더 상태는 변경되지 않으며 파라미터는 복사됩니다.
    pub fn get_query(&self) -> Query {
        let ast = SelectAst {
            from: FromClause {
                declarations: self.declarations.clone(),
            },
            conditions: self.conditions.clone(),
            order_by: self.order_by.clone(),
        };
        Query::new(
            ast,
            self.parameters.clone(),
            self.first_result,
            self.max_results,
        )
    }

    fn add_join(mut self, kind: JoinKind, path: &str, alias: String) -> Self {
        let (parent_alias, association_field) = self.split_path(path);

        // 부모 별칭을 선언(루트 또는 조인)한 루트에 붙이고, 없으면 마지막 루트
        let owner = self
            .declarations
            .iter()
            .position(|d| {
                d.range.alias == parent_alias || d.joins.iter().any(|j| j.alias == parent_alias)
            })
            .or_else(|| self.declarations.len().checked_sub(1));

        if let Some(index) = owner {
            self.declarations[index].joins.push(JoinAssociationDeclaration {
                kind,
                parent_alias,
                association_field,
                alias,
            });
        }
        self
    }

    /// `alias.field` 분리. 점이 없으면 마지막 루트 별칭 기준
    fn split_path(&self, path: &str) -> (String, String) {
        match path.split_once('.') {
            Some((alias, field)) => (alias.trim().to_string(), field.trim().to_string()),
            None => {
                let alias = self
                    .declarations
                    .last()
                    .map(|d| d.range.alias.clone())
                    .unwrap_or_default();
                (alias, path.trim().to_string())
            }
        }
    }
}
