use super::*;

impl MemberService {
    /// Replaces a member's permission set.
    ///
    /// The floor permission is re-added before persisting, so the stored set
    /// always contains `members_view`.
    pub async fn assign_member_permissions(
        &self,
        actor: &MemberIdentity,
        member_id: MemberId,
        requested: PermissionSet,
    ) -> AppResult<PermissionAssignment> {
        let actor_context = self.load_actor(actor).await?;
        let target = self.load_target(member_id).await?;

        authorize_position_or_permission_change(
            &actor_context,
            &target,
            PrivilegeChange::Permissions(&requested),
        )
        .into_result()?;

        let permissions = requested.with_floor();
        self.repository
            .replace_member_permissions(target.id(), &permissions)
            .await?;

        self.audit(
            actor,
            AuditAction::MemberPermissionsReplaced,
            target.id(),
            format!("replaced permissions with [{}]", permissions.as_strs().join(", ")),
        )
        .await;

        Ok(PermissionAssignment {
            added: permissions.len(),
            permissions,
        })
    }
}
