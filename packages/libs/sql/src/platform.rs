//! 저장소 플랫폼 어댑터
//!
//! ACL 필터 SQL은 플랫폼마다 스키마 한정자, 문자열 리터럴 이스케이프,
//! 식별자 인용, 바인딩 플레이스홀더가 다릅니다.
//! SQL 구조 자체는 SeaQuery로 만들고 최종 렌더링만 플랫폼이 담당합니다.
//!
//! - MySQL: 백슬래시를 이중으로 이스케이프 (`App\\Entity\\Document`)
//! - PostgreSQL: 표준 문자열, 백슬래시 그대로
//! - SQLite: 백슬래시 그대로, 스키마 한정자는 항상 `main`

use acf_core::PlatformKind;
use sea_query::{
    Iden, IntoTableRef, MysqlQueryBuilder, PostgresQueryBuilder, SelectStatement,
    SqliteQueryBuilder, TableRef,
};

/// 동적 테이블/컬럼 식별자
#[derive(Debug, Clone)]
pub(crate) struct DynIden(String);

impl DynIden {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Iden for DynIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = write!(s, "{}", self.0);
    }
}

/// `alias.column` 컬럼 참조
pub(crate) fn col(table: &str, column: &str) -> (DynIden, DynIden) {
    (DynIden::new(table), DynIden::new(column))
}

/// 저장소 플랫폼 어댑터
pub trait AclPlatform: Send + Sync {
    /// 플랫폼 종류
    fn kind(&self) -> PlatformKind;

    /// ACL 테이블 스키마 한정자
    fn schema_name(&self, database: Option<&str>) -> Option<String> {
        database
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    /// 문자열 리터럴 (따옴표 포함)
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// [`quote_literal`](AclPlatform::quote_literal)의 역변환
    fn unquote_literal(&self, literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        Some(inner.replace("''", "'"))
    }

    /// 식별자 인용
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// 바인딩 플레이스홀더 (1부터 시작)
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// SELECT 렌더링
    fn render_select(&self, select: &SelectStatement) -> String;
}

/// MySQL / MariaDB
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform;

impl AclPlatform for MySqlPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Mysql
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn unquote_literal(&self, literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => out.push(chars.next()?),
                '\'' => {
                    if chars.next()? != '\'' {
                        return None;
                    }
                    out.push('\'');
                }
                other => out.push(other),
            }
        }
        Some(out)
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn render_select(&self, select: &SelectStatement) -> String {
        select.to_string(MysqlQueryBuilder)
    }
}

/// PostgreSQL
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresPlatform;

impl AclPlatform for PostgresPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn render_select(&self, select: &SelectStatement) -> String {
        select.to_string(PostgresQueryBuilder)
    }
}

/// SQLite (단일 파일 임베디드)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePlatform;

impl AclPlatform for SqlitePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Sqlite
    }

    fn schema_name(&self, _database: Option<&str>) -> Option<String> {
        Some("main".to_string())
    }

    fn render_select(&self, select: &SelectStatement) -> String {
        select.to_string(SqliteQueryBuilder)
    }
}

/// 설정된 플랫폼 종류에 맞는 어댑터
pub fn platform_for(kind: PlatformKind) -> Box<dyn AclPlatform> {
    match kind {
        PlatformKind::Mysql => Box::new(MySqlPlatform),
        PlatformKind::Postgres => Box::new(PostgresPlatform),
        PlatformKind::Sqlite => Box::new(SqlitePlatform),
    }
}

/// 플랫폼 인용된 `table.column` 텍스트 (커스텀 SQL 조각용)
pub(crate) fn qualified_column(platform: &dyn AclPlatform, table: &str, column: &str) -> String {
    format!(
        "{}.{}",
        platform.quote_identifier(table),
        platform.quote_identifier(column)
    )
}

/// 스키마 한정 ACL 테이블 참조
pub(crate) fn acl_table(platform: &dyn AclPlatform, database: Option<&str>, table: &str) -> TableRef {
    match platform.schema_name(database) {
        Some(schema) => (DynIden::new(schema), DynIden::new(table)).into_table_ref(),
        None => DynIden::new(table).into_table_ref(),
    }
}
