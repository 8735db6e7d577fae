//! ACL 필터 적용
//!
//! 쿼리 사본에 ACL 필터 메타데이터를 붙이고 ACL 출력 워커를 지정합니다.
//! 필터 생성 경로는 I/O가 없으며, SQL은 [`Query::to_sql`]에서 만들어집니다.

use std::sync::Arc;

use acf_core::identity::{Identity, SecurityIdentifier, SecurityIdentityExtractor, TokenStorage};
use acf_core::permissions::PermissionMask;
use acf_core::schema::MetadataRegistry;
use acf_core::AclConfig;

use crate::alias::AliasResolver;
use crate::error::Result;
use crate::filter::AclFilterCompiler;
use crate::platform::{platform_for, AclPlatform};
use crate::query::{AclFilterMetadata, OutputWalkerKind, Query, QuerySource};

/// ACL 필터
pub struct AclFilter {
    config: Arc<AclConfig>,
    registry: Arc<MetadataRegistry>,
    token_storage: Arc<dyn TokenStorage>,
    platform: Box<dyn AclPlatform>,
}

impl AclFilter {
    /// 설정의 플랫폼 종류로 어댑터를 선택합니다.
    pub fn new(
        config: Arc<AclConfig>,
        registry: Arc<MetadataRegistry>,
        token_storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let platform = platform_for(config.platform);
        Self {
            config,
            registry,
            token_storage,
            platform,
        }
    }

    /// 플랫폼 어댑터 교체
    pub fn with_platform(mut self, platform: Box<dyn AclPlatform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> &dyn AclPlatform {
        self.platform.as_ref()
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// ACL 필터 적용
    ///
    /// # Arguments
    /// * `query` - 쿼리 빌더 또는 컴파일된 쿼리 (원본은 변경되지 않음)
    /// * `permissions` - 요구 권한 이름. 비어 있으면 설정의 기본 권한
    /// * `identity` - 필터 대상 주체. `None`이면 현재 요청의 주체
    /// * `alias` - 필터를 적용할 별칭. `None`이면 첫 번째 루트
    ///
    /// # Returns
    /// 필터 메타데이터가 추가된 쿼리 사본
    pub fn apply<'q, S: AsRef<str>>(
        &self,
        query: impl Into<QuerySource<'q>>,
        permissions: &[S],
        identity: Option<&Identity>,
        alias: Option<&str>,
    ) -> Result<Query> {
        let current;
        let identity = match identity {
            Some(identity) => identity,
            None => {
                current = self.token_storage.identity();
                &current
            }
        };

        let source: QuerySource<'q> = query.into();
        let mut query = source.to_query()?;

        let mask = if permissions.is_empty() {
            self.config.default_mask()?
        } else {
            PermissionMask::from_names(permissions)?
        };

        let resolved = AliasResolver::new(&self.registry).resolve(query.ast(), alias)?;
        let metadata = resolved.metadata;

        let identifiers = self.security_identifiers(Some(identity));

        let classes = metadata.acl_classes();
        let filter_sql = AclFilterCompiler::new(self.platform(), &self.config).compile(
            classes.as_slice(),
            &identifiers,
            mask,
        );

        tracing::debug!(
            alias = %resolved.alias,
            class = %metadata.name,
            mask = mask.bits(),
            sql = %filter_sql,
            "Applied ACL filter"
        );

        let hints = query.hints_mut();
        hints.push_acl_filter(AclFilterMetadata {
            filter_sql,
            table: self.platform.quote_identifier(&metadata.table),
            alias: resolved.alias,
            identifier_column: metadata.single_identifier_column_name().to_string(),
        });
        hints.set_output_walker(OutputWalkerKind::Acl);

        Ok(query)
    }

    /// 기본 권한으로 필터 적용
    pub fn apply_default<'q>(
        &self,
        query: impl Into<QuerySource<'q>>,
        identity: Option<&Identity>,
        alias: Option<&str>,
    ) -> Result<Query> {
        self.apply(
            query,
            self.config.default_permissions.as_slice(),
            identity,
            alias,
        )
    }

    /// 주체의 보안 식별자 (role 계층 전개 포함)
    pub fn security_identifiers(&self, identity: Option<&Identity>) -> Vec<SecurityIdentifier> {
        let extractor = SecurityIdentityExtractor::new(&self.config.role_hierarchy);
        match identity {
            Some(identity) => extractor.extract(identity),
            None => extractor.extract(&self.token_storage.identity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::QueryBuilder;
    use crate::query::NativeQuery;
    use crate::testing;
    use acf_core::identity::{Principal, StaticTokenStorage};
    use acf_core::schema::{Association, EntityMetadata};
    use serde_json::Value;

    const DOCUMENT: &str = "App\\Entity\\Document";
    const USER: &str = "App\\Entity\\User";

    fn config() -> AclConfig {
        AclConfig::from_yaml(
            r#"
platform: sqlite
role_hierarchy:
  ROLE_EDITOR: [ROLE_VIEWER]
  ROLE_ADMIN: [ROLE_EDITOR]
"#,
        )
        .unwrap()
    }

    fn registry() -> MetadataRegistry {
        MetadataRegistry::new()
            .with_entity(
                EntityMetadata::new(DOCUMENT, "documents")
                    .with_columns(["title", "status"])
                    .with_subclass("App\\Entity\\Report")
                    .with_association("owner", Association::owning(USER, "owner_id")),
            )
            .with_entity(EntityMetadata::new(USER, "users").with_columns(["email"]))
    }

    fn filter_with(identity: Identity) -> AclFilter {
        AclFilter::new(
            Arc::new(config()),
            Arc::new(registry()),
            Arc::new(StaticTokenStorage::new(identity)),
        )
    }

    fn documents() -> QueryBuilder {
        QueryBuilder::new()
            .from(DOCUMENT, "d")
            .where_eq("d.status", "status")
            .set_parameter("status", "published")
    }

    #[test]
    fn test_role_identity_expands_hierarchy() {
        let filter = filter_with(Identity::Anonymous);
        let identity = Identity::from("ROLE_EDITOR");

        let identifiers = filter.security_identifiers(Some(&identity));
        let names: Vec<&str> = identifiers.iter().map(|sid| sid.as_str()).collect();
        assert_eq!(names, vec!["ROLE_EDITOR", "ROLE_VIEWER"]);

        let query = filter
            .apply(&documents(), &["VIEW"], Some(&identity), None)
            .unwrap();
        let acl = &query.hints().acl_filters()[0];
        assert_eq!(acl.alias, "d");
        assert_eq!(acl.table, "\"documents\"");
        assert_eq!(acl.identifier_column, "id");
        assert!(acl.filter_sql.contains("IN ('ROLE_EDITOR', 'ROLE_VIEWER')"));
        assert!(acl.filter_sql.contains("IN ('App\\Entity\\Report', 'App\\Entity\\Document')"));
        assert!(acl.filter_sql.contains("\"e\".\"mask\" >= 1"));
        assert_eq!(query.hints().output_walker(), Some(OutputWalkerKind::Acl));
    }

    #[test]
    fn test_identity_defaults_to_token_storage() {
        let principal = Principal::new(USER, "alice", vec!["ROLE_VIEWER".to_string()]);
        let filter = filter_with(Identity::from(principal));

        let query = filter.apply(&documents(), &["VIEW"], None, None).unwrap();
        let sql = &query.hints().acl_filters()[0].filter_sql;
        assert!(sql.contains("'App\\Entity\\User-alice'"));
        assert!(sql.contains("'ROLE_VIEWER'"));
    }

    #[test]
    fn test_input_query_is_not_modified() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let original = documents().get_query();

        let filtered = filter.apply(&original, &["VIEW"], None, None).unwrap();
        assert!(original.hints().acl_filters().is_empty());
        assert_eq!(original.hints().output_walker(), None);
        assert_eq!(original.parameter("status"), Some(&Value::from("published")));
        assert_eq!(filtered.parameter("status"), Some(&Value::from("published")));
        assert_eq!(filtered.ast(), original.ast());
    }

    #[test]
    fn test_apply_twice_accumulates() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let builder = documents().join("d.owner", "o");

        let first = filter.apply(&builder, &["VIEW"], None, Some("d")).unwrap();
        let second = filter.apply(&first, &["EDIT"], None, Some("o")).unwrap();

        let aliases: Vec<&str> = second
            .hints()
            .acl_filters()
            .iter()
            .map(|acl| acl.alias.as_str())
            .collect();
        assert_eq!(aliases, vec!["d", "o"]);
        assert_eq!(second.hints().acl_filters()[1].table, "\"users\"");
        assert!(second.hints().acl_filters()[1].filter_sql.contains(">= 4"));
        assert_eq!(first.hints().acl_filters().len(), 1);
    }

    #[test]
    fn test_unknown_alias_fails() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let err = filter
            .apply(&documents(), &["VIEW"], None, Some("x"))
            .unwrap_err();
        assert_eq!(err.code(), "ALIAS_NOT_FOUND");
        assert!(err.as_core().is_some_and(|e| e.is_alias_resolution_failure()));
    }

    #[test]
    fn test_unknown_permission_fails() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let err = filter
            .apply(&documents(), &["VIEW", "GRANT"], None, None)
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PERMISSION");
    }

    #[test]
    fn test_native_query_rejected() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let native = NativeQuery::new("SELECT * FROM documents");
        let err = filter.apply(&native, &["VIEW"], None, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_QUERY_SHAPE");
    }

    #[test]
    fn test_empty_permissions_use_default() {
        let filter = filter_with(Identity::from("ROLE_VIEWER"));
        let none: [&str; 0] = [];

        let explicit = filter.apply(&documents(), &none, None, None).unwrap();
        let default = filter.apply_default(&documents(), None, None).unwrap();
        assert_eq!(explicit.hints(), default.hints());
        assert!(default.hints().acl_filters()[0].filter_sql.contains(">= 1"));
    }

    #[test]
    fn test_anonymous_identity_denies() {
        let filter = filter_with(Identity::Anonymous);
        let query = filter.apply(&documents(), &["VIEW"], None, None).unwrap();
        assert!(query.hints().acl_filters()[0].filter_sql.contains("1 = 0"));
    }

    #[tokio::test]
    async fn test_filtered_query_end_to_end() {
        let pool = testing::acl_pool().await;
        for (id, title) in [("d1", "Plan"), ("d2", "Budget"), ("d3", "Roadmap")] {
            sqlx::query("INSERT INTO documents (id, title, status) VALUES (?, ?, 'published')")
                .bind(id)
                .bind(title)
                .execute(&pool)
                .await
                .unwrap();
        }
        let d1 = testing::object_identity(&pool, DOCUMENT, "d1").await;
        let d2 = testing::object_identity(&pool, DOCUMENT, "d2").await;
        testing::object_identity(&pool, DOCUMENT, "d3").await;

        testing::grant(&pool, DOCUMENT, Some(d1), "ROLE_VIEWER", false, 1, None).await;
        testing::grant(&pool, DOCUMENT, Some(d2), "App\\Entity\\User-alice", true, 4, None).await;

        let filter = filter_with(Identity::Anonymous);
        let base = documents().order_by("d.id", false);

        let run = |query: Query| {
            let sql = query.to_sql(filter.registry(), filter.platform()).unwrap();
            let pool = pool.clone();
            async move {
                sqlx::query_scalar::<_, String>(&sql)
                    .fetch_all(&pool)
                    .await
                    .unwrap()
            }
        };

        // ROLE_EDITOR → ROLE_VIEWER 권한으로 d1
        let editor = Identity::from("ROLE_EDITOR");
        let ids = run(filter.apply(&base, &["VIEW"], Some(&editor), None).unwrap()).await;
        assert_eq!(ids, vec!["d1"]);

        // 사용자 직접 권한: EDIT(4) 보유 → VIEW, EDIT 모두 통과
        let alice = Identity::from(Principal::new(USER, "alice", vec![]));
        let ids = run(filter.apply(&base, &["EDIT"], Some(&alice), None).unwrap()).await;
        assert_eq!(ids, vec!["d2"]);

        // 익명 → 모든 행 거부
        let ids = run(filter.apply(&base, &["VIEW"], None, None).unwrap()).await;
        assert!(ids.is_empty());

        // 클래스 전체 권한 (object_identity_id NULL)
        testing::grant(&pool, DOCUMENT, None, "ROLE_ADMIN", false, 128, None).await;
        let admin = Identity::from("ROLE_ADMIN");
        let ids = run(filter.apply(&base, &["MASTER"], Some(&admin), None).unwrap()).await;
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }
}
