//! SQL 출력 워커
//!
//! [`Query`]를 SeaQuery SELECT 문으로 변환합니다.
//!
//! - [`SqlWalker`]: 루트 컬럼, 연관관계 조인, 파라미터 바인딩 조건, 정렬, LIMIT/OFFSET
//! - [`AclWalker`]: 위 결과에 힌트의 ACL 필터마다
//!   `<alias>.<identifier_column> IN (<filter_sql>)` 조건을 AND로 추가

use acf_core::schema::{EntityMetadata, MetadataRegistry};
use sea_query::{Expr, JoinType, Order, Query as SeaQuery, SelectStatement, SimpleExpr};
use serde_json::Value;

use crate::alias::AliasResolver;
use crate::error::{Error, Result};
use crate::platform::{col, DynIden};
use crate::query::{JoinAssociationDeclaration, JoinKind, Predicate, Query};

/// 쿼리 → SELECT 문 변환기
pub trait OutputWalker {
    fn walk_select_statement(&self, query: &Query) -> Result<SelectStatement>;
}

/// 기본 SQL 워커
pub struct SqlWalker<'r> {
    registry: &'r MetadataRegistry,
}

impl<'r> SqlWalker<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self { registry }
    }

    fn walk_join(
        &self,
        select: &mut SelectStatement,
        query: &Query,
        join: &JoinAssociationDeclaration,
    ) -> Result<()> {
        let parent = AliasResolver::new(self.registry)
            .resolve(query.ast(), Some(join.parent_alias.as_str()))?
            .metadata;
        let association = parent
            .association(&join.association_field)
            .ok_or_else(|| missing_association(parent, &join.association_field))?;
        let target = self.registry.get_class_metadata(&association.target_entity)?;

        let on = match (&association.join_column, &association.mapped_by) {
            // 소유 측: 대상 식별자 = 부모의 외래키
            (Some(join_column), _) => Expr::col(col(&join.alias, target.single_identifier_column_name()))
                .equals(col(&join.parent_alias, join_column)),
            // 역방향: 대상의 외래키 = 부모 식별자
            (None, Some(mapped_by)) => {
                let owning_column = target
                    .association(mapped_by)
                    .and_then(|owning| owning.join_column.as_deref())
                    .ok_or_else(|| missing_association(target, mapped_by))?;
                Expr::col(col(&join.alias, owning_column))
                    .equals(col(&join.parent_alias, parent.single_identifier_column_name()))
            }
            (None, None) => return Err(missing_association(parent, &join.association_field)),
        };

        let join_type = match join.kind {
            JoinKind::Inner => JoinType::InnerJoin,
            JoinKind::Left => JoinType::LeftJoin,
        };
        select.join_as(
            join_type,
            DynIden::new(target.table.clone()),
            DynIden::new(join.alias.clone()),
            on,
        );
        Ok(())
    }

    fn walk_predicate(&self, select: &mut SelectStatement, query: &Query, predicate: &Predicate) -> Result<()> {
        let value = query
            .parameter(&predicate.parameter)
            .ok_or_else(|| Error::MissingParameter {
                name: predicate.parameter.clone(),
            })?;
        let column = Expr::col(col(&predicate.alias, &predicate.column));

        let condition = match value {
            Value::Null => column.is_null(),
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| value_to_expr(&predicate.parameter, item))
                    .collect::<Result<Vec<_>>>()?;
                column.is_in(values)
            }
            other => column.eq(value_to_expr(&predicate.parameter, other)?),
        };
        select.and_where(condition);
        Ok(())
    }
}

impl<'r> OutputWalker for SqlWalker<'r> {
    fn walk_select_statement(&self, query: &Query) -> Result<SelectStatement> {
        let mut select = SeaQuery::select();

        for root in &query.ast().from.declarations {
            let metadata = self.registry.get_class_metadata(&root.range.abstract_schema_name)?;
            let alias = &root.range.alias;

            for column in metadata.selectable_columns() {
                select.column(col(alias, column));
            }
            select.from_as(DynIden::new(metadata.table.clone()), DynIden::new(alias.clone()));

            for join in &root.joins {
                self.walk_join(&mut select, query, join)?;
            }
        }

        for predicate in &query.ast().conditions {
            self.walk_predicate(&mut select, query, predicate)?;
        }

        for item in &query.ast().order_by {
            let order = if item.descending { Order::Desc } else { Order::Asc };
            select.order_by(col(&item.alias, &item.column), order);
        }

        if let Some(limit) = query.max_results() {
            select.limit(limit);
        }
        if let Some(offset) = query.first_result() {
            select.offset(offset);
        }

        Ok(select)
    }
}

/// ACL 필터를 적용하는 워커
pub struct AclWalker<'r> {
    inner: SqlWalker<'r>,
}

impl<'r> AclWalker<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self {
            inner: SqlWalker::new(registry),
        }
    }
}

impl<'r> OutputWalker for AclWalker<'r> {
    fn walk_select_statement(&self, query: &Query) -> Result<SelectStatement> {
        let mut select = self.inner.walk_select_statement(query)?;
        let resolver = AliasResolver::new(self.inner.registry);

        for filter in query.hints().acl_filters() {
            // 필터 별칭은 쿼리에 선언되어 있어야 함
            resolver.resolve(query.ast(), Some(filter.alias.as_str()))?;

            select.and_where(
                Expr::col(col(&filter.alias, &filter.identifier_column))
                    .is_in([SimpleExpr::Custom(filter.filter_sql.clone())]),
            );
        }

        Ok(select)
    }
}

fn missing_association(metadata: &EntityMetadata, field: &str) -> Error {
    acf_core::Error::MissingAssociation {
        class: metadata.name.clone(),
        field: field.to_string(),
    }
    .into()
}

/// serde_json::Value를 SeaQuery 값으로 변환
fn value_to_expr(name: &str, value: &Value) -> Result<SimpleExpr> {
    let expr: SimpleExpr = match value {
        Value::Null => Expr::val(Option::<String>::None).into(),
        Value::Bool(b) => Expr::val(*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Expr::val(i).into()
            } else if let Some(f) = n.as_f64() {
                Expr::val(f).into()
            } else {
                Expr::val(n.to_string()).into()
            }
        }
        Value::String(s) => Expr::val(s.as_str()).into(),
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::UnsupportedParameter {
                name: name.to_string(),
            })
        }
    };
    Ok(expr)
}
