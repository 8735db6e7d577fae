//! ACL 필터 SQL 컴파일러
//!
//! 엔티티 클래스 집합, 보안 식별자, 요청 마스크로
//! 허용된 객체 식별자를 돌려주는 서브쿼리를 생성합니다.
//!
//! ```sql
//! SELECT DISTINCT o.object_identifier AS id
//!   FROM acl_object_identities o
//!   INNER JOIN acl_classes c ON c.id = o.class_id
//!   LEFT JOIN acl_entries e ON e.class_id = o.class_id
//!         AND (e.object_identity_id = o.id OR e.object_identity_id IS NULL)
//!   LEFT JOIN acl_security_identities s ON s.id = e.security_identity_id
//!  WHERE c.class_type IN (...) AND s.identifier IN (...) AND e.mask >= ?
//! ```
//!
//! 클래스 이름과 식별자는 플랫폼 규칙으로 이스케이프된 리터럴로 삽입되므로
//! 결과 SQL은 바인딩 없이 그대로 외부 쿼리에 합쳐질 수 있습니다.

use acf_core::identity::SecurityIdentifier;
use acf_core::permissions::PermissionMask;
use acf_core::{AclConfig, AclTables, MaskComparison};
use sea_query::{Condition, Expr, JoinType, Query, SelectStatement, SimpleExpr};

use crate::platform::{acl_table, col, qualified_column, AclPlatform, DynIden};

const OBJECT: &str = "o";
const CLASS: &str = "c";
const ENTRY: &str = "e";
const IDENTITY: &str = "s";

/// ACL 필터 컴파일러
pub struct AclFilterCompiler<'a> {
    platform: &'a dyn AclPlatform,
    database: Option<&'a str>,
    tables: &'a AclTables,
    comparison: MaskComparison,
}

impl<'a> AclFilterCompiler<'a> {
    pub fn new(platform: &'a dyn AclPlatform, config: &'a AclConfig) -> Self {
        Self {
            platform,
            database: config.database.as_deref(),
            tables: &config.tables,
            comparison: config.mask_comparison,
        }
    }

    /// 필터 SQL 생성
    ///
    /// 식별자가 비어 있으면 항상 거짓인 조건이 들어가 어떤 행도 허용하지 않습니다.
    pub fn compile<S: AsRef<str>>(
        &self,
        classes: &[S],
        identifiers: &[SecurityIdentifier],
        mask: PermissionMask,
    ) -> String {
        let select = self.statement(classes, identifiers, mask);
        let sql = self.platform.render_select(&select);
        tracing::debug!(
            classes = classes.len(),
            identifiers = identifiers.len(),
            mask = mask.bits(),
            "Compiled ACL filter"
        );
        sql
    }

    /// 필터 SELECT 문 (렌더링 전)
    pub fn statement<S: AsRef<str>>(
        &self,
        classes: &[S],
        identifiers: &[SecurityIdentifier],
        mask: PermissionMask,
    ) -> SelectStatement {
        let mut select = Query::select();

        select
            .distinct()
            .expr_as(Expr::col(col(OBJECT, "object_identifier")), DynIden::new("id"))
            .from_as(self.table(&self.tables.object_identities), DynIden::new(OBJECT))
            .join_as(
                JoinType::InnerJoin,
                self.table(&self.tables.classes),
                DynIden::new(CLASS),
                Expr::col(col(CLASS, "id")).equals(col(OBJECT, "class_id")),
            )
            .join_as(
                JoinType::LeftJoin,
                self.table(&self.tables.entries),
                DynIden::new(ENTRY),
                Condition::all()
                    .add(Expr::col(col(ENTRY, "class_id")).equals(col(OBJECT, "class_id")))
                    .add(
                        Condition::any()
                            .add(Expr::col(col(ENTRY, "object_identity_id")).equals(col(OBJECT, "id")))
                            .add(Expr::col(col(ENTRY, "object_identity_id")).is_null()),
                    ),
            )
            .join_as(
                JoinType::LeftJoin,
                self.table(&self.tables.security_identities),
                DynIden::new(IDENTITY),
                Expr::col(col(IDENTITY, "id")).equals(col(ENTRY, "security_identity_id")),
            );

        let class_literals: Vec<SimpleExpr> = classes
            .iter()
            .map(|class| self.literal(class.as_ref()))
            .collect();
        select.and_where(Expr::col(col(CLASS, "class_type")).is_in(class_literals));

        if identifiers.is_empty() {
            tracing::warn!("No security identifiers; ACL filter denies every row");
            select.and_where(Expr::cust("1 = 0"));
        } else {
            let identifier_literals: Vec<SimpleExpr> = identifiers
                .iter()
                .map(|identifier| self.literal(identifier.as_str()))
                .collect();
            select.and_where(Expr::col(col(IDENTITY, "identifier")).is_in(identifier_literals));
        }

        select.and_where(self.mask_condition(mask));
        select
    }

    fn mask_condition(&self, mask: PermissionMask) -> SimpleExpr {
        let bits = i64::from(mask.bits());
        match self.comparison {
            MaskComparison::AtLeast => Expr::col(col(ENTRY, "mask")).gte(bits),
            MaskComparison::ContainsAll => {
                let column = qualified_column(self.platform, ENTRY, "mask");
                Expr::cust(format!("({} & {}) = {}", column, bits, bits))
            }
        }
    }

    fn literal(&self, value: &str) -> SimpleExpr {
        SimpleExpr::Custom(self.platform.quote_literal(value))
    }

    fn table(&self, name: &str) -> sea_query::TableRef {
        acl_table(self.platform, self.database, name)
    }
}
