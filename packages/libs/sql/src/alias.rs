//! 쿼리 별칭 해석
//!
//! 쿼리 AST에서 별칭이 가리키는 엔티티를 찾습니다.
//! 루트 선언은 바로, 조인 선언은 부모 별칭을 먼저 해석한 뒤
//! 부모 엔티티의 연관관계 매핑으로 대상 엔티티를 얻습니다.

use std::collections::HashSet;

use acf_core::schema::{EntityMetadata, MetadataRegistry};
use acf_core::{Error, Result};

use crate::query::SelectAst;

/// 해석 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAlias<'r> {
    /// 쿼리 내 별칭
    pub alias: String,
    pub metadata: &'r EntityMetadata,
}

/// 별칭 해석기
pub struct AliasResolver<'r> {
    registry: &'r MetadataRegistry,
}

impl<'r> AliasResolver<'r> {
    pub fn new(registry: &'r MetadataRegistry) -> Self {
        Self { registry }
    }

    /// 별칭 해석
    ///
    /// `alias`가 `None`이면 첫 번째 루트 엔티티를 돌려줍니다.
    pub fn resolve(&self, ast: &SelectAst, alias: Option<&str>) -> Result<ResolvedAlias<'r>> {
        let mut visiting = HashSet::new();
        self.resolve_inner(ast, alias, &mut visiting)
    }

    fn resolve_inner(
        &self,
        ast: &SelectAst,
        alias: Option<&str>,
        visiting: &mut HashSet<String>,
    ) -> Result<ResolvedAlias<'r>> {
        if let Some(alias) = alias {
            // 조인 체인이 자기 자신으로 돌아오면 실패
            if !visiting.insert(alias.to_string()) {
                return Err(not_found(alias));
            }
        }

        for root in &ast.from.declarations {
            let class_name = &root.range.abstract_schema_name;
            let class_alias = &root.range.alias;

            if alias.map_or(true, |a| a == class_alias) {
                return Ok(ResolvedAlias {
                    alias: class_alias.clone(),
                    metadata: self.registry.get_class_metadata(class_name)?,
                });
            }

            let Some(alias) = alias else { continue };

            for join in root.joins.iter().filter(|j| j.alias == alias) {
                let parent = if join.parent_alias != *class_alias {
                    self.resolve_inner(ast, Some(join.parent_alias.as_str()), visiting)?
                        .metadata
                } else {
                    self.registry.get_class_metadata(class_name)?
                };

                let association = parent.association(&join.association_field).ok_or_else(|| {
                    Error::MissingAssociation {
                        class: parent.name.clone(),
                        field: join.association_field.clone(),
                    }
                })?;

                tracing::debug!(
                    alias = %alias,
                    parent = %parent.name,
                    target = %association.target_entity,
                    "Resolved join alias"
                );

                return Ok(ResolvedAlias {
                    alias: join.alias.clone(),
                    metadata: self.registry.get_class_metadata(&association.target_entity)?,
                });
            }
        }

        Err(not_found(alias.unwrap_or_default()))
    }
}

fn not_found(alias: &str) -> Error {
    Error::AliasNotFound {
        alias: alias.to_string(),
    }
}
