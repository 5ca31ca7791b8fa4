use super::*;

impl MemberService {
    /// Applies a field edit after authorizing every touched category.
    ///
    /// The position, when present, is checked with the position rule on top of
    /// the field-edit rule and must belong to the target's church.
    pub async fn update_member(
        &self,
        actor: &MemberIdentity,
        member_id: MemberId,
        changes: MemberFieldChanges,
    ) -> AppResult<MemberRecord> {
        if changes.is_empty() {
            return Err(AppError::Validation(
                "update payload must change at least one field".to_owned(),
            ));
        }

        let actor_context = self.load_actor(actor).await?;
        let target = self.load_target(member_id).await?;

        authorize_field_edit(&actor_context, &target, &changes).into_result()?;

        if changes.touches_position() {
            authorize_position_or_permission_change(
                &actor_context,
                &target,
                PrivilegeChange::Position,
            )
            .into_result()?;

            if let Some(Some(position_id)) = changes.position_id {
                self.repository
                    .find_position(target.church_id(), position_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "position '{position_id}' does not belong to church '{}'",
                            target.church_id()
                        ))
                    })?;
            }
        }

        let detail = format!("updated fields: {}", changes.touched_fields().join(", "));
        let updated = self
            .repository
            .update_member_fields(target.id(), changes)
            .await?;

        self.audit(actor, AuditAction::MemberUpdated, target.id(), detail)
            .await;

        Ok(updated)
    }
}
