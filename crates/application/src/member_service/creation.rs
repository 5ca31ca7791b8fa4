use super::*;

impl MemberService {
    /// Creates a member with the default permissions of its role.
    pub async fn create_member(
        &self,
        actor: &MemberIdentity,
        input: NewMember,
    ) -> AppResult<MemberRecord> {
        let actor_context = self.load_actor(actor).await?;
        let branch = self
            .repository
            .find_branch(input.branch_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("branch '{}' was not found", input.branch_id))
            })?;

        authorize_member_creation(&actor_context, branch, input.role).into_result()?;

        let permissions = PermissionSet::for_role(input.role);
        let member = self
            .repository
            .create_member(branch, input, permissions)
            .await?;

        self.audit(
            actor,
            AuditAction::MemberCreated,
            member.id,
            format!("created member with role '{}'", member.role),
        )
        .await;

        Ok(member)
    }
}
