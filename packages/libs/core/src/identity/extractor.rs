//! 보안 식별자 추출
//!
//! 주체를 ACL 저장소와 대조할 식별자 목록으로 전개합니다.

use std::collections::HashSet;

use super::{Identity, SecurityIdentifier};
use crate::permissions::RoleHierarchy;

/// 보안 식별자 추출기
pub struct SecurityIdentityExtractor<'a> {
    hierarchy: &'a RoleHierarchy,
}

impl<'a> SecurityIdentityExtractor<'a> {
    pub fn new(hierarchy: &'a RoleHierarchy) -> Self {
        Self { hierarchy }
    }

    /// 주체의 전체 식별자 목록 (중복 제거, 최초 등장 순서 유지)
    ///
    /// - 사용자: 사용자 식별자, 이어서 각 role과 그 상위 role
    /// - role 문자열: 해당 role과 그 상위 role
    /// - 익명: 빈 목록
    pub fn extract(&self, identity: &Identity) -> Vec<SecurityIdentifier> {
        let mut identifiers = Vec::new();

        let roles: &[String] = match identity {
            Identity::User(principal) => {
                identifiers.push(SecurityIdentifier::user(
                    &principal.class_name,
                    &principal.username,
                ));
                &principal.roles
            }
            Identity::Role(role) => std::slice::from_ref(role),
            Identity::Anonymous => return identifiers,
        };

        for role in roles {
            identifiers.push(SecurityIdentifier::role(role.as_str()));
            identifiers.extend(
                self.hierarchy
                    .reachable_roles(role)
                    .into_iter()
                    .map(SecurityIdentifier::role),
            );
        }

        dedup_preserving_order(identifiers)
    }
}

fn dedup_preserving_order(identifiers: Vec<SecurityIdentifier>) -> Vec<SecurityIdentifier> {
    let mut seen = HashSet::new();
    identifiers
        .into_iter()
        .filter(|sid| seen.insert(sid.clone()))
        .collect()
}
