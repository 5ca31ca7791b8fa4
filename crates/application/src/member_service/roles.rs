use super::*;

impl MemberService {
    /// Changes a member's role; the repository replaces permissions with the role defaults.
    pub async fn change_member_role(
        &self,
        actor: &MemberIdentity,
        member_id: MemberId,
        new_role: Role,
    ) -> AppResult<MemberRecord> {
        let actor_context = self.load_actor(actor).await?;
        let target = self.load_target(member_id).await?;

        authorize_role_change(&actor_context, &target, new_role, self.role_change_policy)
            .into_result()?;

        self.repository
            .update_member_role(target.id(), new_role)
            .await?;

        self.audit(
            actor,
            AuditAction::MemberRoleChanged,
            target.id(),
            format!("changed role from '{}' to '{new_role}'", target.role()),
        )
        .await;

        self.load_record(target.id()).await
    }
}
