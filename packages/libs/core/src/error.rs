//! 공통 에러 타입
//!
//! ACL 필터 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// ACL 필터 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Query Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unsupported query shape: {kind}")]
    InvalidQueryShape { kind: String },

    #[error("alias '{alias}' is not declared in the query")]
    AliasNotFound { alias: String },

    #[error("entity '{class}' has no association mapping for field '{field}'")]
    MissingAssociation { class: String, field: String },

    #[error("unknown entity class: {class}")]
    UnknownEntity { class: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Permission Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unknown permission: {name}")]
    UnknownPermission { name: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("config parse error: {message}")]
    ConfigParse { message: String },

    #[error("config validation error: {message}")]
    ConfigValidation { message: String },

    #[error("metadata parse error: {message}")]
    MetadataParse { message: String },

    #[error("duplicate entity class: {class}")]
    DuplicateEntity { class: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 에러 코드 (호출자 로깅/매핑용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidQueryShape { .. } => "INVALID_QUERY_SHAPE",
            Error::AliasNotFound { .. } => "ALIAS_NOT_FOUND",
            Error::MissingAssociation { .. } => "MISSING_ASSOCIATION",
            Error::UnknownEntity { .. } => "UNKNOWN_ENTITY",
            Error::UnknownPermission { .. } => "UNKNOWN_PERMISSION",
            Error::ConfigParse { .. } => "CONFIG_PARSE_ERROR",
            Error::ConfigValidation { .. } => "CONFIG_VALIDATION_ERROR",
            Error::MetadataParse { .. } => "METADATA_PARSE_ERROR",
            Error::DuplicateEntity { .. } => "DUPLICATE_ENTITY",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// 별칭 해석 실패 여부
    ///
    /// 별칭을 찾지 못했거나 조인 경로의 연관관계 매핑이 없는 경우입니다.
    pub fn is_alias_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::AliasNotFound { .. } | Error::MissingAssociation { .. } | Error::UnknownEntity { .. }
        )
    }
}
