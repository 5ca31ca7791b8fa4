use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use ecclesia_application::MemberRepository;
use ecclesia_core::{AppError, AppResult, ChurchId};
use ecclesia_domain::{
    BranchId, BranchRef, EmailAddress, MemberContext, MemberFieldChanges, MemberId, MemberRecord,
    NewMember, Permission, PermissionSet, Position, PositionId, Role,
};

mod lookup;
mod mutation;
mod permissions;


use permissions::{commit, write_permissions};

/// PostgreSQL-backed member repository.
#[derive(Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct MemberContextRow {
    id: Uuid,
    role: String,
    branch_id: Uuid,
    church_id: Uuid,
    permissions: Vec<String>,
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: Uuid,
    branch_id: Uuid,
    church_id: Uuid,
    name: String,
    email: String,
    role: String,
    phone: Option<String>,
    address: Option<String>,
    avatar_url: Option<String>,
    birth_date: Option<NaiveDate>,
    position_id: Option<Uuid>,
    position_name: Option<String>,
    permissions: Vec<String>,
}

#[derive(Debug, FromRow)]
struct BranchRow {
    id: Uuid,
    church_id: Uuid,
}

#[derive(Debug, FromRow)]
struct PositionRow {
    id: Uuid,
    name: String,
}

const MEMBER_SELECT: &str = r#"
    SELECT
        members.id,
        members.branch_id,
        branches.church_id,
        members.name,
        members.email,
        members.role,
        members.phone,
        members.address,
        members.avatar_url,
        members.birth_date,
        positions.id AS position_id,
        positions.name AS position_name,
        ARRAY(
            SELECT member_permissions.permission
            FROM member_permissions
            WHERE member_permissions.member_id = members.id
            ORDER BY member_permissions.permission
        ) AS permissions
    FROM members
    INNER JOIN branches
        ON branches.id = members.branch_id
    LEFT JOIN positions
        ON positions.id = members.position_id
    WHERE members.id = $1
"#;

impl TryFrom<MemberContextRow> for MemberContext {
    type Error = AppError;

    fn try_from(row: MemberContextRow) -> Result<Self, Self::Error> {
        let member_id = MemberId::from_uuid(row.id);
        Ok(MemberContext::new(
            member_id,
            decode_role(row.role.as_str(), member_id)?,
            decode_permissions(row.permissions, member_id)?,
            BranchRef {
                branch_id: BranchId::from_uuid(row.branch_id),
                church_id: ChurchId::from_uuid(row.church_id),
            },
        ))
    }
}

impl TryFrom<MemberRow> for MemberRecord {
    type Error = AppError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let member_id = MemberId::from_uuid(row.id);
        let position = match (row.position_id, row.position_name) {
            (Some(id), Some(name)) => Some(Position {
                id: PositionId::from_uuid(id),
                name,
            }),
            _ => None,
        };

        Ok(MemberRecord {
            id: member_id,
            branch: BranchRef {
                branch_id: BranchId::from_uuid(row.branch_id),
                church_id: ChurchId::from_uuid(row.church_id),
            },
            name: row.name,
            email: EmailAddress::new(row.email).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode email for member '{member_id}': {error}"
                ))
            })?,
            role: decode_role(row.role.as_str(), member_id)?,
            permissions: decode_permissions(row.permissions, member_id)?,
            phone: row.phone,
            address: row.address,
            avatar_url: row.avatar_url,
            birth_date: row.birth_date,
            position,
        })
    }
}

fn decode_role(value: &str, member_id: MemberId) -> AppResult<Role> {
    Role::from_str(value).map_err(|error| {
        AppError::Internal(format!(
            "failed to decode role '{value}' for member '{member_id}': {error}"
        ))
    })
}

fn decode_permissions(values: Vec<String>, member_id: MemberId) -> AppResult<PermissionSet> {
    values
        .into_iter()
        .map(|value| {
            Permission::from_str(value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode permission '{value}' for member '{member_id}': {error}"
                ))
            })
        })
        .collect()
}

fn map_email_conflict(error: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("email '{email}' is already in use"));
    }

    AppError::Internal(format!("failed to persist member: {error}"))
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn find_member_context(&self, member_id: MemberId) -> AppResult<Option<MemberContext>> {
        self.find_member_context_impl(member_id).await
    }

    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<MemberRecord>> {
        self.find_member_impl(member_id).await
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchRef>> {
        self.find_branch_impl(branch_id).await
    }

    async fn find_position(
        &self,
        church_id: ChurchId,
        position_id: PositionId,
    ) -> AppResult<Option<Position>> {
        self.find_position_impl(church_id, position_id).await
    }

    async fn create_member(
        &self,
        branch: BranchRef,
        input: NewMember,
        permissions: PermissionSet,
    ) -> AppResult<MemberRecord> {
        self.create_member_impl(branch, input, permissions).await
    }

    async fn update_member_fields(
        &self,
        member_id: MemberId,
        changes: MemberFieldChanges,
    ) -> AppResult<MemberRecord> {
        self.update_member_fields_impl(member_id, changes).await
    }

    async fn update_member_role(&self, member_id: MemberId, role: Role) -> AppResult<()> {
        self.update_member_role_impl(member_id, role).await
    }

    async fn replace_member_permissions(
        &self,
        member_id: MemberId,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        self.replace_member_permissions_impl(member_id, permissions)
            .await
    }
}
