//! 권한 마스크
//!
//! 권한 이름은 정적 테이블로 비트 값에 매핑됩니다.
//! 값은 ACL 저장소에 기록된 마스크와 호환되어야 합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 개별 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    View,
    Create,
    Edit,
    Delete,
    Undelete,
    Operator,
    Master,
    Owner,
    /// 모든 비트 (Symfony `MASK_IDDQD`)
    Iddqd,
}

impl Permission {
    /// 이름 → 권한 정적 테이블
    const TABLE: [(&'static str, Permission); 9] = [
        ("VIEW", Permission::View),
        ("CREATE", Permission::Create),
        ("EDIT", Permission::Edit),
        ("DELETE", Permission::Delete),
        ("UNDELETE", Permission::Undelete),
        ("OPERATOR", Permission::Operator),
        ("MASTER", Permission::Master),
        ("OWNER", Permission::Owner),
        ("IDDQD", Permission::Iddqd),
    ];

    /// 이름에서 파싱 (대소문자 무시)
    pub fn parse(name: &str) -> Result<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == upper)
            .map(|(_, p)| *p)
            .ok_or_else(|| Error::UnknownPermission {
                name: name.to_string(),
            })
    }

    /// 비트 값
    pub fn mask(self) -> u32 {
        match self {
            Permission::View => 1,
            Permission::Create => 1 << 1,
            Permission::Edit => 1 << 2,
            Permission::Delete => 1 << 3,
            Permission::Undelete => 1 << 4,
            Permission::Operator => 1 << 5,
            Permission::Master => 1 << 6,
            Permission::Owner => 1 << 7,
            Permission::Iddqd => (1 << 30) - 1,
        }
    }

    /// 정식 이름
    pub fn name(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(n, _)| *n)
            .unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 요청 권한 비트마스크
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMask(u32);

impl PermissionMask {
    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// 권한 이름 목록을 하나의 마스크로 합침
    ///
    /// 알 수 없는 이름이 하나라도 있으면 실패합니다.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut builder = MaskBuilder::new();
        for name in names {
            builder.add(Permission::parse(name.as_ref())?);
        }
        Ok(builder.get())
    }

    /// 특정 권한 포함 여부
    pub fn contains(self, permission: Permission) -> bool {
        self.0 & permission.mask() == permission.mask()
    }
}

impl From<Permission> for PermissionMask {
    fn from(p: Permission) -> Self {
        Self(p.mask())
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 마스크 빌더
#[derive(Debug, Clone, Default)]
pub struct MaskBuilder {
    mask: u32,
}

impl MaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, permission: Permission) -> &mut Self {
        self.mask |= permission.mask();
        self
    }

    pub fn get(&self) -> PermissionMask {
        PermissionMask(self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parsing() {
        assert_eq!(Permission::parse("VIEW").unwrap(), Permission::View);
        assert_eq!(Permission::parse("edit").unwrap(), Permission::Edit);
        assert_eq!(Permission::parse(" Owner ").unwrap(), Permission::Owner);

        let err = Permission::parse("FLY").unwrap_err();
        assert!(matches!(err, Error::UnknownPermission { ref name } if name == "FLY"));
    }

    #[test]
    fn test_mask_values() {
        assert_eq!(Permission::View.mask(), 1);
        assert_eq!(Permission::Edit.mask(), 4);
        assert_eq!(Permission::Owner.mask(), 128);
        assert_eq!(Permission::Iddqd.mask(), 1_073_741_823);
    }

    #[test]
    fn test_iddqd_covers_every_permission() {
        assert_eq!(Permission::parse("iddqd").unwrap(), Permission::Iddqd);

        let mask = PermissionMask::from_names(&["IDDQD"]).unwrap();
        for (_, permission) in Permission::TABLE {
            assert!(mask.contains(permission), "{}", permission);
        }
    }

    #[test]
    fn test_mask_from_names() {
        let mask = PermissionMask::from_names(&["VIEW", "EDIT"]).unwrap();
        assert_eq!(mask.bits(), 5);
        assert!(mask.contains(Permission::View));
        assert!(mask.contains(Permission::Edit));
        assert!(!mask.contains(Permission::Delete));

        // 중복은 OR이므로 영향 없음
        let mask = PermissionMask::from_names(&["view", "VIEW"]).unwrap();
        assert_eq!(mask.bits(), 1);

        assert!(PermissionMask::from_names(&["VIEW", "nope"]).is_err());
    }

    #[test]
    fn test_mask_builder() {
        let mut builder = MaskBuilder::new();
        builder.add(Permission::View).add(Permission::Delete);
        assert_eq!(builder.get().bits(), 9);
    }
}
