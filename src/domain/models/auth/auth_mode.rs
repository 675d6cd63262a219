use super::permission::Permission;

/// 인증 모드를 정의하는 열거형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함
    Required,
    /// 인증이 선택사항임 (있으면 검증, 없어도 허용)
    Optional,
}

/// 요구되는 권한 정보
#[derive(Debug, Clone)]
pub enum RequiredPermission {
    /// 특정 단일 권한이 필요
    Single(Permission),
    /// 여러 권한 중 하나라도 있으면 허용 (OR 조건)
    Any(Vec<Permission>),
}

impl RequiredPermission {
    /// 보유 권한이 요구사항을 만족하는지 확인
    pub fn is_satisfied(&self, granted: &[Permission]) -> bool {
        match self {
            RequiredPermission::Single(required) => granted.contains(required),
            RequiredPermission::Any(required) => required.iter().any(|p| granted.contains(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::auth::permission::{Action, Resource};

    #[test]
    fn test_single_and_any() {
        let granted = vec![Permission::new(Resource::Files, Action::Read)];

        assert!(RequiredPermission::Single(Permission::new(Resource::Files, Action::Read)).is_satisfied(&granted));
        assert!(!RequiredPermission::Single(Permission::new(Resource::Files, Action::Write)).is_satisfied(&granted));
        assert!(RequiredPermission::Any(vec![
            Permission::new(Resource::Admin, Action::Read),
            Permission::new(Resource::Files, Action::Read),
        ])
        .is_satisfied(&granted));
        assert!(!RequiredPermission::Any(vec![]).is_satisfied(&granted));
    }
}
