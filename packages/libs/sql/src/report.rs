//! 직접 권한 리포트
//!
//! 한 객체(또는 객체의 한 필드)에 직접 부여된 ACL 항목을 나열합니다.
//! role 계층이나 하위 클래스는 전개하지 않으며, 권한 검사도 하지 않습니다.
//! 리포트를 볼 수 있는지는 호출자가 판단해야 합니다.

use acf_core::{AclConfig, AclTables, PlatformKind};
use sea_query::{Expr, JoinType, Query as SeaQuery};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, PgPool, SqlitePool};

use crate::error::Result;
use crate::platform::{acl_table, col, platform_for, qualified_column, AclPlatform, DynIden};

/// 직접 부여된 권한 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AclGrant {
    pub security_identifier: String,
    pub is_username: bool,
    /// ACL 스키마의 `mask`는 INT 컬럼
    #[sqlx(try_from = "i32")]
    pub mask: i64,
}

/// ACL 테이블이 있는 데이터베이스 커넥션 풀
#[derive(Debug, Clone)]
pub enum AclStore {
    Sqlite(SqlitePool),
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl AclStore {
    pub fn kind(&self) -> PlatformKind {
        match self {
            AclStore::Sqlite(_) => PlatformKind::Sqlite,
            AclStore::MySql(_) => PlatformKind::Mysql,
            AclStore::Postgres(_) => PlatformKind::Postgres,
        }
    }
}

/// 풀 종류별로 같은 조회를 실행 (sqlx 드라이버마다 타입이 다름)
macro_rules! fetch_grants {
    ($pool:expr, $sql:expr, $class_type:expr, $object_id:expr, $field:expr) => {{
        let mut query = sqlx::query_as::<_, AclGrant>($sql)
            .bind($class_type)
            .bind($object_id);
        if let Some(field) = $field {
            query = query.bind(field);
        }
        query.fetch_all($pool).await?
    }};
}

/// ACL 저장소 조회
pub struct AclQuery {
    store: AclStore,
    platform: Box<dyn AclPlatform>,
    database: Option<String>,
    tables: AclTables,
}

impl AclQuery {
    /// 설정의 플랫폼으로 SQL 방언을 고릅니다.
    ///
    /// 풀의 드라이버가 `config.platform`과 다르면 `ConfigValidation` 에러입니다.
    pub fn new(store: AclStore, config: &AclConfig) -> Result<Self> {
        if store.kind() != config.platform {
            return Err(acf_core::Error::ConfigValidation {
                message: format!(
                    "ACL store is {:?} but platform is configured as {:?}",
                    store.kind(),
                    config.platform
                ),
            }
            .into());
        }

        Ok(Self {
            store,
            platform: platform_for(config.platform),
            database: config.database.clone(),
            tables: config.tables.clone(),
        })
    }

    /// `query_acl`이 실행하는 SQL (설정된 플랫폼 기준)
    pub fn sql(&self, has_field: bool) -> String {
        self.statement(self.platform.as_ref(), has_field)
    }

    /// 리포트 SQL
    ///
    /// 바인딩 순서: `class_type`, `object_identifier`, (`field`)
    pub fn statement(&self, platform: &dyn AclPlatform, has_field: bool) -> String {
        let table = |name: &str| acl_table(platform, self.database.as_deref(), name);
        let bound = |alias: &str, column: &str, index: usize| {
            Expr::cust(format!(
                "{} = {}",
                qualified_column(platform, alias, column),
                platform.placeholder(index)
            ))
        };

        let mut select = SeaQuery::select();
        select
            .expr_as(Expr::col(col("s", "identifier")), DynIden::new("security_identifier"))
            .expr_as(Expr::col(col("s", "username")), DynIden::new("is_username"))
            .expr_as(Expr::col(col("e", "mask")), DynIden::new("mask"))
            .from_as(table(&self.tables.entries), DynIden::new("e"))
            .join_as(
                JoinType::LeftJoin,
                table(&self.tables.classes),
                DynIden::new("c"),
                Expr::col(col("c", "id")).equals(col("e", "class_id")),
            )
            .join_as(
                JoinType::LeftJoin,
                table(&self.tables.object_identities),
                DynIden::new("o"),
                Expr::col(col("o", "id")).equals(col("e", "object_identity_id")),
            )
            .join_as(
                JoinType::LeftJoin,
                table(&self.tables.security_identities),
                DynIden::new("s"),
                Expr::col(col("s", "id")).equals(col("e", "security_identity_id")),
            )
            .and_where(bound("c", "class_type", 1))
            .and_where(bound("o", "object_identifier", 2));

        if has_field {
            select.and_where(bound("e", "field", 3));
        } else {
            select.and_where(Expr::col(col("e", "field")).is_null());
        }

        platform.render_select(&select)
    }

    /// 객체에 직접 부여된 권한 목록
    ///
    /// `field`가 `None`이면 객체 수준 항목만, 아니면 해당 필드 항목만 돌려줍니다.
    /// 항목이 없으면 빈 목록입니다.
    pub async fn query_acl(
        &self,
        class_type: &str,
        object_id: impl ToString,
        field: Option<&str>,
    ) -> Result<Vec<AclGrant>> {
        let object_id = object_id.to_string();
        let sql = self.sql(field.is_some());

        let grants = match &self.store {
            AclStore::Sqlite(pool) => {
                fetch_grants!(pool, &sql, class_type, object_id.as_str(), field)
            }
            AclStore::MySql(pool) => {
                fetch_grants!(pool, &sql, class_type, object_id.as_str(), field)
            }
            AclStore::Postgres(pool) => {
                fetch_grants!(pool, &sql, class_type, object_id.as_str(), field)
            }
        };

        tracing::debug!(
            class_type = %class_type,
            object_id = %object_id,
            platform = ?self.store.kind(),
            count = grants.len(),
            "Queried direct ACL grants"
        );
        Ok(grants)
    }
}
