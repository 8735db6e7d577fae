//! 인증 주체와 보안 식별자
//!
//! # 개요
//!
//! ACL 저장소는 문자열 보안 식별자로 권한을 기록합니다.
//!
//! - 사용자: `"<ClassName>-<username>"`
//! - Role: `"ROLE_<name>"`
//!
//! 필터 대상 주체는 인증된 사용자, 단일 role 문자열, 또는 익명입니다.
//! 주체가 주어지지 않으면 [`TokenStorage`]에서 현재 요청의 주체를 가져옵니다.

mod extractor;

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

pub use extractor::SecurityIdentityExtractor;

/// 보안 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityIdentifier(String);

impl SecurityIdentifier {
    /// 사용자 식별자 생성
    pub fn user(class_name: &str, username: &str) -> Self {
        Self(format!("{}-{}", class_name, username))
    }

    /// Role 식별자 생성
    pub fn role(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecurityIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 인증된 사용자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// 사용자 엔티티 클래스 이름 (예: `App\Entity\User`)
    pub class_name: String,

    /// 사용자 이름
    pub username: String,

    /// 직접 보유한 role 목록
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(class_name: impl Into<String>, username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            class_name: class_name.into(),
            username: username.into(),
            roles,
        }
    }
}

/// 필터 대상 주체
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// 인증된 사용자
    User(Principal),

    /// 단일 role 문자열
    Role(String),

    /// 익명 (식별자 없음 → 모든 행 거부)
    #[default]
    Anonymous,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

impl From<Principal> for Identity {
    fn from(principal: Principal) -> Self {
        Identity::User(principal)
    }
}

impl From<&str> for Identity {
    fn from(role: &str) -> Self {
        Identity::Role(role.to_string())
    }
}

impl From<String> for Identity {
    fn from(role: String) -> Self {
        Identity::Role(role)
    }
}

/// 현재 요청의 인증 주체 제공자
///
/// 호스트 웹 프레임워크의 세션/토큰 계층이 구현합니다.
pub trait TokenStorage: Send + Sync {
    fn identity(&self) -> Identity;
}

/// 메모리 기반 토큰 저장소
///
/// 요청 처리 전에 `set_identity`로 주체를 설정합니다.
#[derive(Debug, Default)]
pub struct StaticTokenStorage {
    identity: RwLock<Identity>,
}

impl StaticTokenStorage {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(identity),
        }
    }

    pub fn set_identity(&self, identity: Identity) {
        let mut guard = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = identity;
    }

    pub fn clear(&self) {
        self.set_identity(Identity::Anonymous);
    }
}

impl TokenStorage for StaticTokenStorage {
    fn identity(&self) -> Identity {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
