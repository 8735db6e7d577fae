//! 엔티티 메타데이터 정의

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 엔티티 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// 엔티티 클래스 이름 (예: `App\Entity\Document`)
    pub name: String,

    /// 테이블 이름 (인용 전)
    pub table: String,

    /// 단일 식별자 컬럼
    #[serde(default)]
    pub id: IdColumn,

    /// 식별자를 제외한 매핑 컬럼
    #[serde(default)]
    pub columns: Vec<String>,

    /// 매핑된 하위 클래스 이름
    #[serde(default)]
    pub subclasses: Vec<String>,

    /// 연관관계 (필드 이름 → 매핑)
    #[serde(default)]
    pub associations: HashMap<String, Association>,
}

impl EntityMetadata {
    /// 최소 메타데이터 생성 (식별자 컬럼 `id`)
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id: IdColumn::default(),
            columns: Vec::new(),
            subclasses: Vec::new(),
            associations: HashMap::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subclass(mut self, class: impl Into<String>) -> Self {
        self.subclasses.push(class.into());
        self
    }

    pub fn with_association(mut self, field: impl Into<String>, association: Association) -> Self {
        self.associations.insert(field.into(), association);
        self
    }

    /// 단일 식별자 컬럼 이름
    pub fn single_identifier_column_name(&self) -> &str {
        &self.id.name
    }

    /// 연관관계 조회
    pub fn association(&self, field: &str) -> Option<&Association> {
        self.associations.get(field)
    }

    /// ACL 클래스 목록 (하위 클래스들, 마지막에 자기 자신)
    pub fn acl_classes(&self) -> Vec<&str> {
        self.subclasses
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }

    /// SELECT 대상 컬럼 (식별자 먼저)
    pub fn selectable_columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.name.as_str())
            .chain(self.columns.iter().map(String::as_str).filter(move |c| *c != self.id.name))
    }
}

/// 식별자 컬럼
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdColumn {
    #[serde(default = "default_id_name")]
    pub name: String,
}

impl Default for IdColumn {
    fn default() -> Self {
        Self {
            name: default_id_name(),
        }
    }
}

fn default_id_name() -> String {
    "id".to_string()
}

/// 연관관계 매핑
///
/// 소유 측은 `join_column`(이 테이블의 FK 컬럼)을,
/// 역방향 측은 `mapped_by`(대상 엔티티의 소유 측 필드)를 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// 대상 엔티티 클래스
    pub target_entity: String,

    /// 소유 측 FK 컬럼
    #[serde(default)]
    pub join_column: Option<String>,

    /// 역방향: 대상 엔티티의 소유 측 필드 이름
    #[serde(default)]
    pub mapped_by: Option<String>,
}

impl Association {
    /// 소유 측 (ManyToOne / OneToOne) 연관관계
    pub fn owning(target_entity: impl Into<String>, join_column: impl Into<String>) -> Self {
        Self {
            target_entity: target_entity.into(),
            join_column: Some(join_column.into()),
            mapped_by: None,
        }
    }

    /// 역방향 (OneToMany) 연관관계
    pub fn inverse(target_entity: impl Into<String>, mapped_by: impl Into<String>) -> Self {
        Self {
            target_entity: target_entity.into(),
            join_column: None,
            mapped_by: Some(mapped_by.into()),
        }
    }
}
