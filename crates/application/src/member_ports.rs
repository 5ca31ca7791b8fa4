use async_trait::async_trait;
use ecclesia_core::{AppResult, ChurchId};
use ecclesia_domain::{
    BranchId, BranchRef, MemberContext, MemberFieldChanges, MemberId, MemberRecord, NewMember,
    PermissionSet, Position, PositionId, Role,
};

/// Result of a permission assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionAssignment {
    /// Number of permissions now held by the member.
    pub added: usize,
    /// Materialized permission set after the replacement.
    pub permissions: PermissionSet,
}

/// Persistence port for member reads and mutations.
///
/// Implementations own transactions. Permission replacement, whether
/// explicit or triggered by a role change, must never expose a partially
/// replaced set to concurrent readers.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Loads the authorization snapshot of a member.
    async fn find_member_context(&self, member_id: MemberId) -> AppResult<Option<MemberContext>>;

    /// Loads the full member record.
    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<MemberRecord>>;

    /// Resolves a branch and its church.
    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchRef>>;

    /// Resolves a position owned by a church.
    async fn find_position(
        &self,
        church_id: ChurchId,
        position_id: PositionId,
    ) -> AppResult<Option<Position>>;

    /// Inserts a member with its initial materialized permissions.
    async fn create_member(
        &self,
        branch: BranchRef,
        input: NewMember,
        permissions: PermissionSet,
    ) -> AppResult<MemberRecord>;

    /// Applies field changes and returns the updated record.
    async fn update_member_fields(
        &self,
        member_id: MemberId,
        changes: MemberFieldChanges,
    ) -> AppResult<MemberRecord>;

    /// Sets the role and replaces permissions with `PermissionSet::for_role(role)`.
    async fn update_member_role(&self, member_id: MemberId, role: Role) -> AppResult<()>;

    /// Replaces the whole permission set atomically.
    async fn replace_member_permissions(
        &self,
        member_id: MemberId,
        permissions: &PermissionSet,
    ) -> AppResult<()>;
}
