//! 역할 기반 권한 테이블
//!
//! 역할별 권한은 분기 코드가 아닌 정적 데이터([`ROLE_PERMISSIONS`])로 정의됩니다.
//! 새 역할을 추가할 때는 테이블에 한 줄을 추가하면 됩니다.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::entities::users::UserRole;

/// 보호 대상 리소스 범주
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Files,
    Documents,
    Admin,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Files => "files",
            Resource::Documents => "documents",
            Resource::Admin => "admin",
        }
    }
}

/// 리소스에 대한 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

/// `resource:action` 형태의 권한
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::new(Resource::Users, Action::Read),
    Permission::new(Resource::Users, Action::Write),
    Permission::new(Resource::Users, Action::Delete),
    Permission::new(Resource::Files, Action::Read),
    Permission::new(Resource::Files, Action::Write),
    Permission::new(Resource::Files, Action::Delete),
    Permission::new(Resource::Documents, Action::Read),
    Permission::new(Resource::Documents, Action::Write),
    Permission::new(Resource::Documents, Action::Delete),
    Permission::new(Resource::Admin, Action::Read),
    Permission::new(Resource::Admin, Action::Write),
];

const USER_PERMISSIONS: &[Permission] = &[
    Permission::new(Resource::Files, Action::Read),
    Permission::new(Resource::Files, Action::Write),
    Permission::new(Resource::Documents, Action::Read),
    Permission::new(Resource::Documents, Action::Write),
];

/// 역할 → 권한 집합
pub const ROLE_PERMISSIONS: &[(UserRole, &[Permission])] = &[
    (UserRole::Admin, ADMIN_PERMISSIONS),
    (UserRole::User, USER_PERMISSIONS),
];

/// 시작 시 한 번 구성되는 역할별 권한 조회 테이블
#[derive(Debug, Clone)]
pub struct RolePermissions {
    table: HashMap<UserRole, Vec<Permission>>,
}

impl RolePermissions {
    pub fn from_table(entries: &[(UserRole, &[Permission])]) -> Self {
        let table = entries
            .iter()
            .map(|(role, permissions)| (*role, permissions.to_vec()))
            .collect();
        Self { table }
    }

    /// 역할의 권한 목록. 테이블에 없는 역할은 빈 목록입니다.
    pub fn for_role(&self, role: UserRole) -> Vec<Permission> {
        self.table.get(&role).cloned().unwrap_or_default()
    }
}

impl Default for RolePermissions {
    fn default() -> Self {
        Self::from_table(ROLE_PERMISSIONS)
    }
}
