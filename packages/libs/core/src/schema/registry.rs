//! 메타데이터 레지스트리
//!
//! 클래스 이름으로 엔티티 메타데이터를 조회합니다.
//! 쿼리 별칭 해석기와 SQL 출력 워커가 이 레지스트리를 공유합니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityMetadata;
use crate::error::{Error, Result};

/// 엔티티 메타데이터 레지스트리
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRegistry {
    /// 클래스 이름 → 메타데이터
    pub entities: HashMap<String, EntityMetadata>,
}

impl MetadataRegistry {
    /// 빈 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔티티 추가 (같은 이름이면 교체)
    pub fn add_entity(&mut self, metadata: EntityMetadata) {
        self.entities.insert(metadata.name.clone(), metadata);
    }

    /// 엔티티 추가 (builder)
    pub fn with_entity(mut self, metadata: EntityMetadata) -> Self {
        self.add_entity(metadata);
        self
    }

    /// 클래스 메타데이터 조회
    pub fn get_class_metadata(&self, class: &str) -> Result<&EntityMetadata> {
        self.entities.get(class).ok_or_else(|| Error::UnknownEntity {
            class: class.to_string(),
        })
    }

    /// 엔티티 존재 여부
    pub fn has_entity(&self, class: &str) -> bool {
        self.entities.contains_key(class)
    }

    /// 연관관계 검증
    ///
    /// 모든 연관관계가 등록된 엔티티를 가리키는지,
    /// 매핑 정보(join_column 또는 mapped_by)가 있는지 확인합니다.
    pub fn validate_associations(&self) -> Vec<AssociationError> {
        let mut errors = Vec::new();

        for entity in self.entities.values() {
            for (field, association) in &entity.associations {
                if !self.entities.contains_key(&association.target_entity) {
                    errors.push(AssociationError::TargetNotFound {
                        class: entity.name.clone(),
                        field: field.clone(),
                        target: association.target_entity.clone(),
                    });
                    continue;
                }
                if association.join_column.is_none() && association.mapped_by.is_none() {
                    errors.push(AssociationError::MappingMissing {
                        class: entity.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }

        errors
    }
}

/// 연관관계 검증 에러
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationError {
    TargetNotFound {
        class: String,
        field: String,
        target: String,
    },
    MappingMissing {
        class: String,
        field: String,
    },
}
