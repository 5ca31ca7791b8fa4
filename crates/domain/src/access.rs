//! Membership checks shared by route gating and the member edit policy.

use crate::{MemberContext, Permission, Role};

/// Returns whether the actor holds a materialized permission.
#[must_use]
pub fn has_permission(actor: &MemberContext, permission: Permission) -> bool {
    actor.permissions().contains(permission)
}

/// Returns whether the actor holds at least one of the permissions.
#[must_use]
pub fn has_any_permission(actor: &MemberContext, permissions: &[Permission]) -> bool {
    permissions
        .iter()
        .any(|permission| has_permission(actor, *permission))
}

/// Returns whether the actor's role is one of the allowed roles.
#[must_use]
pub fn has_any_role(actor: &MemberContext, allowed_roles: &[Role]) -> bool {
    allowed_roles.contains(&actor.role())
}

/// Returns whether the actor administers a branch or the whole church.
///
/// This is the single place role-based elevation is decided.
#[must_use]
pub fn is_elevated(actor: &MemberContext) -> bool {
    actor.role().is_elevated()
}

#[cfg(test)]
mod tests {
    use ecclesia_core::ChurchId;

    use super::{has_any_permission, has_any_role, has_permission, is_elevated};
    use crate::{BranchId, BranchRef, MemberContext, MemberId, Permission, PermissionSet, Role};

    fn actor(role: Role, permissions: PermissionSet) -> MemberContext {
        MemberContext::new(
            MemberId::new(),
            role,
            permissions,
            BranchRef {
                branch_id: BranchId::new(),
                church_id: ChurchId::new(),
            },
        )
    }

    #[test]
    fn permission_checks_use_materialized_set_only() {
        let coordinator = actor(
            Role::Coordinator,
            PermissionSet::from_iter([Permission::EventsManage]),
        );

        assert!(has_permission(&coordinator, Permission::EventsManage));
        assert!(!has_permission(&coordinator, Permission::MembersView));
    }

    #[test]
    fn admin_role_does_not_imply_unmaterialized_permission() {
        let admin = actor(Role::AdminGeral, PermissionSet::new());
        assert!(!has_permission(&admin, Permission::FinancesManage));
        assert!(is_elevated(&admin));
    }

    #[test]
    fn any_permission_matches_one_of_many() {
        let member = actor(
            Role::Member,
            PermissionSet::from_iter([Permission::ManagePermissions]),
        );
        assert!(has_any_permission(
            &member,
            &[Permission::MembersManage, Permission::ManagePermissions]
        ));
        assert!(!has_any_permission(&member, &[]));
    }

    #[test]
    fn role_gate_matches_listed_roles() {
        let coordinator = actor(Role::Coordinator, PermissionSet::new());
        assert!(has_any_role(
            &coordinator,
            &[Role::Coordinator, Role::AdminFilial]
        ));
        assert!(!has_any_role(&coordinator, &[Role::AdminGeral]));
        assert!(!is_elevated(&coordinator));
    }
}
