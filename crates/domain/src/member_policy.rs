//! Member edit authorization.
//!
//! Every function here is a pure decision over two [`MemberContext`]
//! snapshots. Expected denials come back as [`AccessDecision::Deny`]; nothing
//! here performs I/O or returns errors.

use std::fmt::{Display, Formatter};

use ecclesia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::access::{has_any_permission, has_permission, is_elevated};
use crate::{BranchRef, MemberContext, MemberFieldChanges, Permission, PermissionSet, Role, Scope};


/// Stable classification of an authorization denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Actor role is too junior for the operation.
    InsufficientRole,
    /// Target lies outside the branch or church the actor administers.
    OutOfScope,
    /// Members cannot change their own email.
    SelfEmailForbidden,
    /// A plain member cannot hold restricted permissions.
    RestrictedPermissionRequiresCoordinator,
    /// Role can only be granted by the system bootstrap.
    SystemOnlyRole,
}

impl DenialReason {
    /// Returns the stable reason code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::OutOfScope => "OUT_OF_SCOPE",
            Self::SelfEmailForbidden => "SELF_EMAIL_FORBIDDEN",
            Self::RestrictedPermissionRequiresCoordinator => {
                "RESTRICTED_PERMISSION_REQUIRES_COORDINATOR"
            }
            Self::SystemOnlyRole => "SYSTEM_ONLY_ROLE",
        }
    }
}

/// A denial with its reason and a user-facing Portuguese message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenial {
    reason: DenialReason,
    message: String,
    restricted_permissions: Vec<Permission>,
}

impl AccessDenial {
    fn new(reason: DenialReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            restricted_permissions: Vec::new(),
        }
    }

    fn restricted(restricted_permissions: Vec<Permission>) -> Self {
        let names = restricted_permissions
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            reason: DenialReason::RestrictedPermissionRequiresCoordinator,
            message: format!(
                "Membros com a função MEMBER não podem receber as permissões restritas: {names}. Promova o membro a COORDINATOR primeiro."
            ),
            restricted_permissions,
        }
    }

    /// Returns the denial classification.
    #[must_use]
    pub fn reason(&self) -> DenialReason {
        self.reason
    }

    /// Returns the user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the requested permissions that tripped the restricted gate.
    #[must_use]
    pub fn restricted_permissions(&self) -> &[Permission] {
        &self.restricted_permissions
    }
}

impl Display for AccessDenial {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.message.as_str())
    }
}

/// Outcome of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The operation is refused.
    Deny(AccessDenial),
}

impl AccessDecision {
    fn deny(reason: DenialReason, message: impl Into<String>) -> Self {
        Self::Deny(AccessDenial::new(reason, message))
    }

    /// Returns whether the operation may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the denial, if any.
    #[must_use]
    pub fn denial(&self) -> Option<&AccessDenial> {
        match self {
            Self::Allow => None,
            Self::Deny(denial) => Some(denial),
        }
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<DenialReason> {
        self.denial().map(AccessDenial::reason)
    }

    /// Converts a denial into [`AppError::Forbidden`] carrying its message.
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(AppError::Forbidden(denial.message)),
        }
    }
}

/// Configurable role-change rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChangePolicy {
    /// Whether an ADMINGERAL may promote another member to ADMINGERAL.
    ///
    /// Creation of ADMINGERAL members stays system-only regardless.
    pub allow_admin_geral_promotion: bool,
}

impl Default for RoleChangePolicy {
    fn default() -> Self {
        Self {
            allow_admin_geral_promotion: true,
        }
    }
}

/// Requested change handled by [`authorize_position_or_permission_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeChange<'a> {
    /// The target's position is being set or cleared.
    Position,
    /// The target's permission set is being replaced.
    Permissions(&'a PermissionSet),
}

#[derive(Debug, Clone, Copy)]
enum ManagedAction {
    Edit,
    RoleChange,
}

impl ManagedAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Edit => "editar",
            Self::RoleChange => "alterar a função de",
        }
    }
}

/// Decides whether the actor may edit the target's core fields.
///
/// Members may edit their own profile except the email. Editing someone
/// else requires ADMINGERAL (same church) or ADMINFILIAL (same branch) and a
/// role at least as senior as the target's.
pub fn authorize_field_edit(
    actor: &MemberContext,
    target: &MemberContext,
    changes: &MemberFieldChanges,
) -> AccessDecision {
    match Scope::between(actor, target) {
        Scope::SameMember if changes.touches_email() => AccessDecision::deny(
            DenialReason::SelfEmailForbidden,
            "Você não pode alterar o seu próprio e-mail.",
        ),
        Scope::SameMember => AccessDecision::Allow,
        scope => authorize_managed(actor, target, scope, ManagedAction::Edit),
    }
}

/// Decides whether the actor may set the target's role to `new_role`.
///
/// The authorizer approves the role value only; the caller replaces the
/// target's permission set with [`PermissionSet::for_role`] afterwards.
pub fn authorize_role_change(
    actor: &MemberContext,
    target: &MemberContext,
    new_role: Role,
    policy: RoleChangePolicy,
) -> AccessDecision {
    if !is_elevated(actor) {
        return AccessDecision::deny(
            DenialReason::InsufficientRole,
            "Apenas administradores podem alterar funções de membros.",
        );
    }

    let scope = Scope::between(actor, target);
    if scope == Scope::SameMember {
        return AccessDecision::deny(
            DenialReason::InsufficientRole,
            "Você não pode alterar a sua própria função.",
        );
    }

    let decision = authorize_managed(actor, target, scope, ManagedAction::RoleChange);
    if !decision.is_allowed() {
        return decision;
    }

    match actor.role() {
        Role::AdminGeral
            if new_role == Role::AdminGeral && !policy.allow_admin_geral_promotion =>
        {
            system_only_role()
        }
        Role::AdminFilial if new_role.is_elevated() => AccessDecision::deny(
            DenialReason::InsufficientRole,
            "Administradores de filial só podem atribuir as funções COORDINATOR ou MEMBER.",
        ),
        _ => AccessDecision::Allow,
    }
}

/// Decides whether the actor may change the target's position or permission set.
///
/// Uses the same scope rule as [`authorize_field_edit`] for other members.
/// Changing one's own position or permissions requires `members_manage` or
/// `MANAGE_PERMISSIONS`. Restricted permissions are never granted to a
/// target whose role is exactly MEMBER.
pub fn authorize_position_or_permission_change(
    actor: &MemberContext,
    target: &MemberContext,
    change: PrivilegeChange<'_>,
) -> AccessDecision {
    let decision = match Scope::between(actor, target) {
        Scope::SameMember => {
            if has_any_permission(
                actor,
                &[Permission::MembersManage, Permission::ManagePermissions],
            ) {
                AccessDecision::Allow
            } else {
                AccessDecision::deny(
                    DenialReason::InsufficientRole,
                    "Você não tem permissão para alterar o seu próprio cargo ou permissões.",
                )
            }
        }
        scope => authorize_managed(actor, target, scope, ManagedAction::Edit),
    };

    if !decision.is_allowed() {
        return decision;
    }

    match change {
        PrivilegeChange::Permissions(requested) if target.role() == Role::Member => {
            let restricted = requested.restricted();
            if restricted.is_empty() {
                AccessDecision::Allow
            } else {
                AccessDecision::Deny(AccessDenial::restricted(restricted))
            }
        }
        _ => AccessDecision::Allow,
    }
}

/// Decides whether the actor may read the target's record.
///
/// Everyone may read themselves; reading others requires `members_view` and
/// the same church.
pub fn authorize_member_view(actor: &MemberContext, target: &MemberContext) -> AccessDecision {
    match Scope::between(actor, target) {
        Scope::SameMember => AccessDecision::Allow,
        Scope::DifferentChurch => AccessDecision::deny(
            DenialReason::OutOfScope,
            "Você só pode visualizar membros da sua igreja.",
        ),
        Scope::SameBranch | Scope::SameChurchDifferentBranch => {
            if has_permission(actor, Permission::MembersView) {
                AccessDecision::Allow
            } else {
                AccessDecision::deny(
                    DenialReason::InsufficientRole,
                    "Você não tem permissão para visualizar membros.",
                )
            }
        }
    }
}

/// Decides whether the actor may create a member with `role` in `branch`.
///
/// ADMINGERAL members are only ever created by the system bootstrap.
pub fn authorize_member_creation(
    actor: &MemberContext,
    branch: BranchRef,
    role: Role,
) -> AccessDecision {
    if role == Role::AdminGeral {
        return system_only_role();
    }

    if !is_elevated(actor) {
        return AccessDecision::deny(
            DenialReason::InsufficientRole,
            "Apenas administradores podem cadastrar membros.",
        );
    }

    if branch.church_id != actor.church_id() {
        return AccessDecision::deny(
            DenialReason::OutOfScope,
            "Você só pode cadastrar membros na sua igreja.",
        );
    }

    if actor.role() == Role::AdminFilial {
        if branch.branch_id != actor.branch_id() {
            return AccessDecision::deny(
                DenialReason::OutOfScope,
                "Você só pode cadastrar membros na sua filial.",
            );
        }
        if role.is_elevated() {
            return AccessDecision::deny(
                DenialReason::InsufficientRole,
                "Administradores de filial só podem cadastrar membros com as funções COORDINATOR ou MEMBER.",
            );
        }
    }

    AccessDecision::Allow
}

fn authorize_managed(
    actor: &MemberContext,
    target: &MemberContext,
    scope: Scope,
    action: ManagedAction,
) -> AccessDecision {
    let verb = action.verb();
    match (actor.role(), scope) {
        (Role::Coordinator | Role::Member, _) => AccessDecision::deny(
            DenialReason::InsufficientRole,
            "Você só pode editar o seu próprio perfil.",
        ),
        (Role::AdminGeral, Scope::DifferentChurch) => AccessDecision::deny(
            DenialReason::OutOfScope,
            format!("Você só pode {verb} membros da sua igreja."),
        ),
        (Role::AdminFilial, Scope::SameChurchDifferentBranch | Scope::DifferentChurch) => {
            AccessDecision::deny(
                DenialReason::OutOfScope,
                format!("Você só pode {verb} membros da sua filial."),
            )
        }
        _ if actor.role().is_same_or_senior_to(target.role()) => AccessDecision::Allow,
        _ => AccessDecision::deny(
            DenialReason::InsufficientRole,
            format!("Você não pode {verb} um membro com função superior à sua."),
        ),
    }
}

fn system_only_role() -> AccessDecision {
    AccessDecision::deny(
        DenialReason::SystemOnlyRole,
        "A função ADMINGERAL só pode ser atribuída pelo sistema.",
    )
}
