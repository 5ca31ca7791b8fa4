use std::collections::BTreeSet;
use std::str::FromStr;

use ecclesia_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Granular capabilities materialized against members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Allows creating and editing members.
    #[serde(rename = "members_manage")]
    MembersManage,
    /// Allows reading member records. Every member holds it.
    #[serde(rename = "members_view")]
    MembersView,
    /// Allows editing church and branch settings.
    #[serde(rename = "church_manage")]
    ChurchManage,
    /// Allows managing finances.
    #[serde(rename = "finances_manage")]
    FinancesManage,
    /// Allows publishing devotionals.
    #[serde(rename = "devotional_manage")]
    DevotionalManage,
    /// Allows managing events.
    #[serde(rename = "events_manage")]
    EventsManage,
    /// Allows registering contributions.
    #[serde(rename = "contributions_manage")]
    ContributionsManage,
    /// Allows assigning permissions to other members.
    #[serde(rename = "MANAGE_PERMISSIONS")]
    ManagePermissions,
    /// Allows managing the permission catalog of a church.
    #[serde(rename = "permission_manage")]
    PermissionManage,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MembersManage => "members_manage",
            Self::MembersView => "members_view",
            Self::ChurchManage => "church_manage",
            Self::FinancesManage => "finances_manage",
            Self::DevotionalManage => "devotional_manage",
            Self::EventsManage => "events_manage",
            Self::ContributionsManage => "contributions_manage",
            Self::ManagePermissions => "MANAGE_PERMISSIONS",
            Self::PermissionManage => "permission_manage",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::MembersManage,
            Permission::MembersView,
            Permission::ChurchManage,
            Permission::FinancesManage,
            Permission::DevotionalManage,
            Permission::EventsManage,
            Permission::ContributionsManage,
            Permission::ManagePermissions,
            Permission::PermissionManage,
        ];

        ALL
    }

    /// Returns whether a plain `MEMBER` is barred from holding this permission.
    #[must_use]
    pub const fn is_restricted(self) -> bool {
        matches!(
            self,
            Self::MembersManage
                | Self::ChurchManage
                | Self::FinancesManage
                | Self::ContributionsManage
                | Self::ManagePermissions
                | Self::PermissionManage
        )
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

/// Permission that every member holds after any role or permission mutation.
pub const FLOOR_PERMISSION: Permission = Permission::MembersView;

/// Materialized permission set of one member.
///
/// Ordered and duplicate free. Sets produced by [`PermissionSet::for_role`]
/// and [`PermissionSet::with_floor`] always contain [`FLOOR_PERMISSION`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns the default materialized set for a role, floor included.
    ///
    /// Administrators receive the whole catalog, everyone else only the floor.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        if role.is_elevated() {
            Self::all_known()
        } else {
            Self::from_iter([FLOOR_PERMISSION])
        }
    }

    /// Returns the full permission catalog.
    #[must_use]
    pub fn all_known() -> Self {
        Self::from_iter(Permission::all().iter().copied())
    }

    /// Returns the set with the floor permission re-added if missing.
    #[must_use]
    pub fn with_floor(mut self) -> Self {
        self.0.insert(FLOOR_PERMISSION);
        self
    }

    /// Returns whether the set contains a permission.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns the restricted permissions in this set, in catalog order.
    #[must_use]
    pub fn restricted(&self) -> Vec<Permission> {
        self.0
            .iter()
            .copied()
            .filter(|permission| permission.is_restricted())
            .collect()
    }

    /// Returns the number of permissions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates permissions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Returns storage values in catalog order.
    #[must_use]
    pub fn as_strs(&self) -> Vec<&'static str> {
        self.iter().map(|permission| permission.as_str()).collect()
    }

    /// Parses transport values, rejecting unknown names instead of dropping them.
    pub fn from_transport<I, S>(values: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| Permission::from_transport(value.as_ref()))
            .collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Stable audit actions emitted by member use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a member is created.
    MemberCreated,
    /// Emitted when member core fields or position change.
    MemberUpdated,
    /// Emitted when a member role changes.
    MemberRoleChanged,
    /// Emitted when a member permission set is replaced.
    MemberPermissionsReplaced,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemberCreated => "member.created",
            Self::MemberUpdated => "member.updated",
            Self::MemberRoleChanged => "member.role.changed",
            Self::MemberPermissionsReplaced => "member.permissions.replaced",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{FLOOR_PERMISSION, Permission, PermissionSet};
    use crate::Role;

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            assert_eq!(
                Permission::from_str(permission.as_str()).ok(),
                Some(*permission)
            );
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("finance_manage").is_err());
        assert!(Permission::from_str("manage_permissions").is_err());
    }

    #[test]
    fn transport_set_rejects_whole_request_on_unknown_name() {
        let parsed = PermissionSet::from_transport(["events_manage", "typo_manage"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn transport_set_collapses_duplicates() {
        let parsed = PermissionSet::from_transport(["events_manage", "events_manage"]);
        assert_eq!(parsed.map(|set| set.len()).ok(), Some(1));
    }

    #[test]
    fn admins_default_to_full_catalog() {
        assert_eq!(
            PermissionSet::for_role(Role::AdminGeral),
            PermissionSet::all_known()
        );
        assert_eq!(
            PermissionSet::for_role(Role::AdminFilial),
            PermissionSet::all_known()
        );
    }

    #[test]
    fn non_admins_default_to_floor_only() {
        for role in [Role::Member, Role::Coordinator] {
            let defaults = PermissionSet::for_role(role);
            assert_eq!(defaults.as_strs(), vec!["members_view"]);
        }
    }

    #[test]
    fn floor_is_re_added() {
        let set = PermissionSet::from_iter([Permission::EventsManage]).with_floor();
        assert!(set.contains(FLOOR_PERMISSION));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn floor_and_content_permissions_are_not_restricted() {
        assert!(!Permission::MembersView.is_restricted());
        assert!(!Permission::EventsManage.is_restricted());
        assert!(!Permission::DevotionalManage.is_restricted());
        assert!(Permission::FinancesManage.is_restricted());
    }
}
