use crate::model::role::Role;

/// Role-to-endpoint authorization: static data, checked once in the bearer
/// middleware. Paths are matched against the scope prefix after the
/// configurable API prefix has been stripped.
pub struct PolicyRule {
    pub prefix: &'static str,
    pub roles: &'static [Role],
}

pub static ACCESS_POLICY: &[PolicyRule] = &[
    PolicyRule {
        prefix: "/admin",
        roles: &[Role::Admin],
    },
    PolicyRule {
        prefix: "/managers",
        roles: &[Role::Manager, Role::Admin],
    },
    PolicyRule {
        prefix: "/employees",
        roles: &[Role::Employee, Role::Manager, Role::Admin],
    },
];

/// First matching prefix wins; paths outside the table only require a valid
/// token.
pub fn role_allowed(scoped_path: &str, role: Role) -> bool {
    for rule in ACCESS_POLICY {
        if scoped_path.starts_with(rule.prefix) {
            return rule.roles.contains(&role);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_scope_is_admin_only() {
        assert!(role_allowed("/admin/users", Role::Admin));
        assert!(!role_allowed("/admin/users", Role::Manager));
        assert!(!role_allowed("/admin/managers/initiate-registration", Role::Employee));
    }

    #[test]
    fn manager_scope_admits_admin() {
        assert!(role_allowed("/managers/team", Role::Manager));
        assert!(role_allowed("/managers/team", Role::Admin));
        assert!(!role_allowed("/managers/team", Role::Employee));
    }

    #[test]
    fn employee_scope_admits_all_roles() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert!(role_allowed("/employees/profile", role));
        }
    }

    #[test]
    fn unlisted_paths_only_need_authentication() {
        assert!(role_allowed("/somewhere-else", Role::Employee));
    }
}
