use std::collections::HashMap;

use async_trait::async_trait;
use ecclesia_application::MemberRepository;
use ecclesia_core::{AppError, AppResult, ChurchId};
use ecclesia_domain::{
    BranchId, BranchRef, EmailAddress, MemberContext, MemberFieldChanges, MemberId, MemberRecord,
    NewMember, PermissionSet, Position, PositionId, Role,
};
use tokio::sync::RwLock;


/// In-memory member repository implementation.
///
/// Every mutation runs under one write lock, so permission replacement is
/// observed atomically by readers.
#[derive(Debug, Default)]
pub struct InMemoryMemberRepository {
    members: RwLock<HashMap<MemberId, MemberRecord>>,
    branches: RwLock<HashMap<BranchId, BranchRef>>,
    positions: RwLock<HashMap<PositionId, (ChurchId, Position)>>,
}

impl InMemoryMemberRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a branch.
    pub async fn insert_branch(&self, branch: BranchRef) {
        self.branches.write().await.insert(branch.branch_id, branch);
    }

    /// Registers a position owned by a church.
    pub async fn insert_position(&self, church_id: ChurchId, position: Position) {
        self.positions
            .write()
            .await
            .insert(position.id, (church_id, position));
    }

    /// Stores a fully-formed member record, as the system bootstrap does.
    pub async fn insert_member(&self, record: MemberRecord) -> AppResult<()> {
        let mut members = self.members.write().await;
        ensure_email_available(&members, &record.email, record.id)?;
        members.insert(record.id, record);
        Ok(())
    }
}

fn ensure_email_available(
    members: &HashMap<MemberId, MemberRecord>,
    email: &EmailAddress,
    owner: MemberId,
) -> AppResult<()> {
    let taken = members
        .values()
        .any(|member| member.id != owner && &member.email == email);

    if taken {
        return Err(AppError::Conflict(format!(
            "email '{}' is already in use",
            email.as_str()
        )));
    }

    Ok(())
}

fn member_not_found(member_id: MemberId) -> AppError {
    AppError::NotFound(format!("member '{member_id}' was not found"))
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn find_member_context(&self, member_id: MemberId) -> AppResult<Option<MemberContext>> {
        Ok(self
            .members
            .read()
            .await
            .get(&member_id)
            .map(MemberRecord::context))
    }

    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<MemberRecord>> {
        Ok(self.members.read().await.get(&member_id).cloned())
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchRef>> {
        Ok(self.branches.read().await.get(&branch_id).copied())
    }

    async fn find_position(
        &self,
        church_id: ChurchId,
        position_id: PositionId,
    ) -> AppResult<Option<Position>> {
        Ok(self
            .positions
            .read()
            .await
            .get(&position_id)
            .and_then(|(owner, position)| (*owner == church_id).then(|| position.clone())))
    }

    async fn create_member(
        &self,
        branch: BranchRef,
        input: NewMember,
        permissions: PermissionSet,
    ) -> AppResult<MemberRecord> {
        let record = MemberRecord {
            id: MemberId::new(),
            branch,
            name: input.name.into(),
            email: input.email,
            role: input.role,
            permissions,
            phone: input.phone,
            address: None,
            avatar_url: None,
            birth_date: None,
            position: None,
        };

        self.insert_member(record.clone()).await?;
        Ok(record)
    }

    async fn update_member_fields(
        &self,
        member_id: MemberId,
        changes: MemberFieldChanges,
    ) -> AppResult<MemberRecord> {
        let positions = self.positions.read().await;
        let mut members = self.members.write().await;

        let church_id = members
            .get(&member_id)
            .map(|record| record.branch.church_id)
            .ok_or_else(|| member_not_found(member_id))?;

        if let Some(email) = &changes.email {
            ensure_email_available(&members, email, member_id)?;
        }

        let position = match changes.position_id {
            Some(Some(position_id)) => Some(
                positions
                    .get(&position_id)
                    .filter(|(owner, _)| *owner == church_id)
                    .map(|(_, position)| position.clone())
                    .ok_or_else(|| {
                        AppError::Validation(format!("position '{position_id}' was not found"))
                    })?,
            ),
            _ => None,
        };

        let record = members
            .get_mut(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;
        changes.apply_to(record, position);

        Ok(record.clone())
    }

    async fn update_member_role(&self, member_id: MemberId, role: Role) -> AppResult<()> {
        let mut members = self.members.write().await;
        let record = members
            .get_mut(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;

        record.role = role;
        record.permissions = PermissionSet::for_role(role);
        Ok(())
    }

    async fn replace_member_permissions(
        &self,
        member_id: MemberId,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        let mut members = self.members.write().await;
        let record = members
            .get_mut(&member_id)
            .ok_or_else(|| member_not_found(member_id))?;

        record.permissions = permissions.clone();
        Ok(())
    }
}
