use std::sync::Arc;

use ecclesia_core::{AppError, AppResult, MemberIdentity};
use ecclesia_domain::member_policy::{
    authorize_field_edit, authorize_member_creation, authorize_member_view,
    authorize_position_or_permission_change, authorize_role_change,
};
use ecclesia_domain::{
    AuditAction, MemberContext, MemberFieldChanges, MemberId, MemberRecord, NewMember,
    PermissionSet, PrivilegeChange, Role, RoleChangePolicy,
};

use tracing::warn;

use crate::{AuditEvent, AuditRepository, MemberRepository, PermissionAssignment};

mod creation;
mod edit;
mod permissions;
mod roles;


/// Application service for authorization-checked member management.
///
/// Every call reloads actor and target from the repository; nothing is
/// cached between requests.
#[derive(Clone)]
pub struct MemberService {
    repository: Arc<dyn MemberRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    role_change_policy: RoleChangePolicy,
}

impl MemberService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MemberRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        role_change_policy: RoleChangePolicy,
    ) -> Self {
        Self {
            repository,
            audit_repository,
            role_change_policy,
        }
    }

    /// Returns a member record the actor is allowed to see.
    pub async fn get_member(
        &self,
        actor: &MemberIdentity,
        member_id: MemberId,
    ) -> AppResult<MemberRecord> {
        let actor_context = self.load_actor(actor).await?;
        let target = self.load_record(member_id).await?;

        authorize_member_view(&actor_context, &target.context()).into_result()?;

        Ok(target)
    }

    async fn load_actor(&self, actor: &MemberIdentity) -> AppResult<MemberContext> {
        let member_id = MemberId::from_uuid(actor.member_id());
        let context = self
            .repository
            .find_member_context(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))?;

        if context.church_id() != actor.church_id() {
            return Err(AppError::Unauthorized(format!(
                "session church '{}' does not match member '{member_id}'",
                actor.church_id()
            )));
        }

        Ok(context)
    }

    async fn load_target(&self, member_id: MemberId) -> AppResult<MemberContext> {
        self.repository
            .find_member_context(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))
    }

    async fn load_record(&self, member_id: MemberId) -> AppResult<MemberRecord> {
        self.repository
            .find_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))
    }

    /// Appends an audit event for a mutation that has already committed.
    ///
    /// A failed append is logged and swallowed; the caller still reports
    /// success because the change itself is persisted.
    async fn audit(
        &self,
        actor: &MemberIdentity,
        action: AuditAction,
        member_id: MemberId,
        detail: String,
    ) {
        let result = self
            .audit_repository
            .append_event(AuditEvent {
                church_id: actor.church_id(),
                subject: actor.member_id().to_string(),
                action,
                resource_type: "member".to_owned(),
                resource_id: member_id.to_string(),
                detail: Some(detail),
            })
            .await;

        if let Err(error) = result {
            warn!(
                action = action.as_str(),
                member_id = %member_id,
                error = %error,
                "audit append failed after committed member mutation"
            );
        }
    }
}
