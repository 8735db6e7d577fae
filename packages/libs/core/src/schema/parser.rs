//! 메타데이터 YAML 파서
//!
//! 엔티티 매핑 YAML을 파싱하여 [`MetadataRegistry`]로 변환합니다.
//!
//! ```yaml
//! entities:
//!   App\Entity\Document:
//!     table: documents
//!     id: { name: id }
//!     columns: [title, owner_id]
//!     subclasses: [App\Entity\Report]
//!     associations:
//!       owner: { target: App\Entity\User, joinColumn: owner_id }
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use super::entity::{Association, EntityMetadata, IdColumn};
use super::registry::{AssociationError, MetadataRegistry};
use crate::error::{Error, Result};

/// 메타데이터 파서
pub struct MetadataParser;

impl MetadataParser {
    /// 단일 YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<Vec<EntityMetadata>> {
        let raw: RawMapping = serde_yaml::from_str(yaml)?;
        Self::convert_raw_mapping(raw)
    }

    /// 여러 YAML 문서를 파싱하여 레지스트리 생성
    pub fn parse_multiple(yamls: &[&str]) -> Result<MetadataRegistry> {
        let mut all_entities = Vec::new();

        for yaml in yamls {
            all_entities.extend(Self::parse_yaml(yaml)?);
        }

        Self::build_registry(all_entities)
    }

    /// 엔티티 목록을 레지스트리로 변환
    ///
    /// 클래스 이름 중복과 연관관계 대상을 검증합니다.
    pub fn build_registry(entities: Vec<EntityMetadata>) -> Result<MetadataRegistry> {
        let mut registry = MetadataRegistry::new();

        for entity in entities {
            if registry.has_entity(&entity.name) {
                return Err(Error::DuplicateEntity {
                    class: entity.name.clone(),
                });
            }
            registry.add_entity(entity);
        }

        if let Some(error) = registry.validate_associations().into_iter().next() {
            let message = match error {
                AssociationError::TargetNotFound {
                    class,
                    field,
                    target,
                } => format!("{}::{} targets unknown entity {}", class, field, target),
                AssociationError::MappingMissing { class, field } => {
                    format!("{}::{} needs joinColumn or mappedBy", class, field)
                }
            };
            return Err(Error::MetadataParse { message });
        }

        Ok(registry)
    }

    fn convert_raw_mapping(raw: RawMapping) -> Result<Vec<EntityMetadata>> {
        let mut entities = Vec::new();

        for (name, raw_entity) in raw.entities {
            entities.push(Self::convert_raw_entity(name, raw_entity)?);
        }

        // 이름순 정렬 (일관성)
        entities.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entities)
    }

    fn convert_raw_entity(name: String, raw: RawEntity) -> Result<EntityMetadata> {
        let table = match raw.table {
            Some(table) if !table.trim().is_empty() => table,
            _ => {
                return Err(Error::MetadataParse {
                    message: format!("entity '{}' requires a table name", name),
                })
            }
        };

        let associations = raw
            .associations
            .unwrap_or_default()
            .into_iter()
            .map(|(field, a)| {
                (
                    field,
                    Association {
                        target_entity: a.target,
                        join_column: a.join_column,
                        mapped_by: a.mapped_by,
                    },
                )
            })
            .collect();

        Ok(EntityMetadata {
            name,
            table,
            id: IdColumn {
                name: raw
                    .id
                    .and_then(|id| id.name)
                    .unwrap_or_else(|| IdColumn::default().name),
            },
            columns: raw.columns.unwrap_or_default(),
            subclasses: raw.subclasses.unwrap_or_default(),
            associations,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw YAML 구조체 (serde 역직렬화용)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawMapping {
    entities: HashMap<String, RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    table: Option<String>,
    id: Option<RawIdColumn>,
    columns: Option<Vec<String>>,
    subclasses: Option<Vec<String>>,
    associations: Option<HashMap<String, RawAssociation>>,
}

#[derive(Debug, Deserialize)]
struct RawIdColumn {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAssociation {
    target: String,
    #[serde(rename = "joinColumn")]
    join_column: Option<String>,
    #[serde(rename = "mappedBy")]
    mapped_by: Option<String>,
}
