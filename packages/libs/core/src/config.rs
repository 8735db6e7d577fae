//! ACL 필터 설정
//!
//! YAML 파일에서 로드하고 환경변수로 일부 값을 덮어씁니다.
//! 로드 시점에 기본 권한 이름과 테이블 이름을 검증하므로
//! 요청 처리 중에는 설정 오류가 발생하지 않습니다.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::permissions::{PermissionMask, RoleHierarchy};

/// ACL 필터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclConfig {
    /// ACL 저장소 플랫폼
    #[serde(default)]
    pub platform: PlatformKind,

    /// ACL 테이블 스키마(데이터베이스) 이름
    ///
    /// SQLite에서는 무시되고 항상 `main`이 사용됩니다.
    #[serde(default)]
    pub database: Option<String>,

    /// Role 계층 (role → 부모 role 목록)
    #[serde(default)]
    pub role_hierarchy: RoleHierarchy,

    /// 권한 목록이 주어지지 않을 때 사용할 기본 권한
    #[serde(default = "default_permissions")]
    pub default_permissions: Vec<String>,

    /// 마스크 비교 방식
    #[serde(default)]
    pub mask_comparison: MaskComparison,

    /// ACL 테이블 이름
    #[serde(default)]
    pub tables: AclTables,
}

fn default_permissions() -> Vec<String> {
    vec!["VIEW".to_string()]
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            database: None,
            role_hierarchy: RoleHierarchy::default(),
            default_permissions: default_permissions(),
            mask_comparison: MaskComparison::default(),
            tables: AclTables::default(),
        }
    }
}

impl AclConfig {
    /// YAML 문자열에서 로드 (검증 포함)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AclConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// YAML 파일에서 로드 (검증 포함)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// 환경변수로 덮어쓰기
    ///
    /// - `ACF_PLATFORM`: mysql | postgres | sqlite
    /// - `ACF_DATABASE`: ACL 테이블 스키마 이름
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(platform) = env::var("ACF_PLATFORM") {
            self.platform = PlatformKind::parse(&platform)?;
        }
        if let Ok(database) = env::var("ACF_DATABASE") {
            let database = database.trim().to_string();
            self.database = if database.is_empty() { None } else { Some(database) };
        }
        Ok(self)
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<()> {
        if self.default_permissions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "default_permissions must not be empty".to_string(),
            });
        }
        PermissionMask::from_names(&self.default_permissions).map_err(|e| {
            Error::ConfigValidation {
                message: format!("default_permissions: {}", e),
            }
        })?;

        for role in self.role_hierarchy.roles() {
            if role.trim().is_empty()
                || self
                    .role_hierarchy
                    .parents(role)
                    .iter()
                    .any(|p| p.trim().is_empty())
            {
                return Err(Error::ConfigValidation {
                    message: "role_hierarchy contains an empty role name".to_string(),
                });
            }
        }

        let cyclic = self.role_hierarchy.cyclic_roles();
        if !cyclic.is_empty() {
            tracing::warn!(roles = ?cyclic, "role hierarchy contains cycles");
        }

        self.tables.validate()
    }

    /// 기본 권한 마스크
    pub fn default_mask(&self) -> Result<PermissionMask> {
        PermissionMask::from_names(&self.default_permissions)
    }
}

/// ACL 저장소 플랫폼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Mysql,
    Postgres,
    Sqlite,
}

impl PlatformKind {
    /// 문자열에서 파싱
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(PlatformKind::Mysql),
            "postgres" | "postgresql" | "pgsql" => Ok(PlatformKind::Postgres),
            "sqlite" | "sqlite3" => Ok(PlatformKind::Sqlite),
            other => Err(Error::ConfigParse {
                message: format!("unknown platform: {}", other),
            }),
        }
    }
}

/// 마스크 비교 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskComparison {
    /// 저장된 마스크 >= 요청 마스크 (상위 비트가 더 넓은 권한)
    #[default]
    AtLeast,

    /// 저장된 마스크가 요청된 비트를 모두 포함
    ContainsAll,
}

/// ACL 테이블 이름
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclTables {
    #[serde(default = "default_class_table")]
    pub classes: String,
    #[serde(default = "default_object_identity_table")]
    pub object_identities: String,
    #[serde(default = "default_entry_table")]
    pub entries: String,
    #[serde(default = "default_security_identity_table")]
    pub security_identities: String,
}

fn default_class_table() -> String {
    "acl_classes".to_string()
}
fn default_object_identity_table() -> String {
    "acl_object_identities".to_string()
}
fn default_entry_table() -> String {
    "acl_entries".to_string()
}
fn default_security_identity_table() -> String {
    "acl_security_identities".to_string()
}

impl Default for AclTables {
    fn default() -> Self {
        Self {
            classes: default_class_table(),
            object_identities: default_object_identity_table(),
            entries: default_entry_table(),
            security_identities: default_security_identity_table(),
        }
    }
}

impl AclTables {
    fn validate(&self) -> Result<()> {
        let names = [
            &self.classes,
            &self.object_identities,
            &self.entries,
            &self.security_identities,
        ];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "ACL table names must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AclConfig::default();
        assert_eq!(config.platform, PlatformKind::Mysql);
        assert_eq!(config.default_permissions, vec!["VIEW"]);
        assert_eq!(config.default_mask().unwrap().bits(), 1);
        assert_eq!(config.tables.entries, "acl_entries");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
platform: sqlite
database: acl
default_permissions: [view, edit]
mask_comparison: contains_all
role_hierarchy:
  ROLE_ADMIN: [ROLE_EDITOR]
  ROLE_EDITOR: [ROLE_VIEWER]
tables:
  entries: security_acl_entries
"#;
        let config = AclConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.platform, PlatformKind::Sqlite);
        assert_eq!(config.database.as_deref(), Some("acl"));
        assert_eq!(config.default_mask().unwrap().bits(), 5);
        assert_eq!(config.mask_comparison, MaskComparison::ContainsAll);
        assert_eq!(
            config.role_hierarchy.reachable_roles("ROLE_ADMIN"),
            vec!["ROLE_EDITOR", "ROLE_VIEWER"]
        );
        assert_eq!(config.tables.entries, "security_acl_entries");
        assert_eq!(config.tables.classes, "acl_classes");
    }

    #[test]
    fn test_unknown_default_permission_rejected_at_load() {
        let yaml = r#"
default_permissions: [VIEW, TELEPORT]
"#;
        let err = AclConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let yaml = r#"
tables:
  classes: ""
"#;
        assert!(AclConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!(PlatformKind::parse("PostgreSQL").unwrap(), PlatformKind::Postgres);
        assert_eq!(PlatformKind::parse("sqlite3").unwrap(), PlatformKind::Sqlite);
        assert!(PlatformKind::parse("oracle").is_err());
    }
}
