//! Role 계층
//!
//! `role → [부모 role...]` 매핑입니다. 설정 파일에서 로드되며
//! 자기 자신을 부모로 두거나 간접 순환(A → B → A)이 있을 수 있습니다.
//! 전개는 방문 집합을 가진 명시적 스택으로 수행하므로 항상 종료합니다.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Role 계층 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHierarchy {
    roles: HashMap<String, Vec<String>>,
}

impl RoleHierarchy {
    /// 빈 계층
    pub fn new() -> Self {
        Self::default()
    }

    /// Role과 부모 목록 추가 (builder)
    pub fn with_role<I, S>(mut self, role: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(role.into(), parents.into_iter().map(Into::into).collect());
        self
    }

    /// 직접 부모 목록
    pub fn parents(&self, role: &str) -> &[String] {
        self.roles.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 계층에 키로 등록된 role 여부
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// 등록된 모든 role
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// 도달 가능한 모든 상위 role (깊이 우선, 전위 순서)
    ///
    /// 시작 role 자신은 포함하지 않으며, 각 role은 한 번만 나타납니다.
    pub fn reachable_roles(&self, role: &str) -> Vec<String> {
        let mut reached = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(role);

        let mut stack: Vec<&str> = self.parents(role).iter().rev().map(String::as_str).collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            reached.push(current.to_string());
            stack.extend(self.parents(current).iter().rev().map(String::as_str));
        }

        reached
    }

    /// 순환에 포함된 role 목록 (정렬됨)
    ///
    /// 자기 자신으로 돌아올 수 있는 role을 찾습니다. 설정 로드 시 경고용입니다.
    pub fn cyclic_roles(&self) -> Vec<String> {
        let mut cyclic: Vec<String> = self
            .roles
            .keys()
            .filter(|role| {
                self.parents(role)
                    .iter()
                    .any(|p| p == *role || self.reachable_roles(p).iter().any(|r| r == *role))
            })
            .cloned()
            .collect();
        cyclic.sort();
        cyclic
    }
}

impl From<HashMap<String, Vec<String>>> for RoleHierarchy {
    fn from(roles: HashMap<String, Vec<String>>) -> Self {
        Self { roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_hierarchy() {
        let hierarchy = RoleHierarchy::new()
            .with_role("ROLE_ADMIN", ["ROLE_EDITOR"])
            .with_role("ROLE_EDITOR", ["ROLE_VIEWER"]);

        assert_eq!(
            hierarchy.reachable_roles("ROLE_ADMIN"),
            vec!["ROLE_EDITOR", "ROLE_VIEWER"]
        );
        assert_eq!(hierarchy.reachable_roles("ROLE_VIEWER"), Vec::<String>::new());
        assert_eq!(hierarchy.reachable_roles("ROLE_UNKNOWN"), Vec::<String>::new());
    }

    #[test]
    fn test_preorder_with_shared_parent() {
        let hierarchy = RoleHierarchy::new()
            .with_role("ROLE_A", ["ROLE_B", "ROLE_C"])
            .with_role("ROLE_B", ["ROLE_D", "ROLE_C"]);

        // B → D → C 순서, C는 한 번만
        assert_eq!(
            hierarchy.reachable_roles("ROLE_A"),
            vec!["ROLE_B", "ROLE_D", "ROLE_C"]
        );
    }

    #[test]
    fn test_self_reference_excluded() {
        let hierarchy = RoleHierarchy::new().with_role("ROLE_USER", ["ROLE_USER", "ROLE_GUEST"]);

        assert_eq!(hierarchy.reachable_roles("ROLE_USER"), vec!["ROLE_GUEST"]);
        assert_eq!(hierarchy.cyclic_roles(), vec!["ROLE_USER"]);
    }

    #[test]
    fn test_indirect_cycle_terminates() {
        let hierarchy = RoleHierarchy::new()
            .with_role("ROLE_A", ["ROLE_B"])
            .with_role("ROLE_B", ["ROLE_C"])
            .with_role("ROLE_C", ["ROLE_A"]);

        assert_eq!(hierarchy.reachable_roles("ROLE_A"), vec!["ROLE_B", "ROLE_C"]);
        assert_eq!(hierarchy.reachable_roles("ROLE_C"), vec!["ROLE_A", "ROLE_B"]);
        assert_eq!(
            hierarchy.cyclic_roles(),
            vec!["ROLE_A", "ROLE_B", "ROLE_C"]
        );
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
ROLE_ADMIN: [ROLE_EDITOR, ROLE_ALLOWED_TO_SWITCH]
ROLE_EDITOR: [ROLE_VIEWER]
"#;
        let hierarchy: RoleHierarchy = serde_yaml::from_str(yaml).unwrap();
        assert!(hierarchy.contains("ROLE_ADMIN"));
        assert_eq!(hierarchy.parents("ROLE_EDITOR"), ["ROLE_VIEWER".to_string()]);
        assert!(hierarchy.cyclic_roles().is_empty());
    }
}
