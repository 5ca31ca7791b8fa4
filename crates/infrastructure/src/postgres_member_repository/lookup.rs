use super::*;

impl PostgresMemberRepository {
    pub(super) async fn find_member_context_impl(
        &self,
        member_id: MemberId,
    ) -> AppResult<Option<MemberContext>> {
        let row = sqlx::query_as::<_, MemberContextRow>(
            r#"
            SELECT
                members.id,
                members.role,
                members.branch_id,
                branches.church_id,
                ARRAY(
                    SELECT member_permissions.permission
                    FROM member_permissions
                    WHERE member_permissions.member_id = members.id
                ) AS permissions
            FROM members
            INNER JOIN branches
                ON branches.id = members.branch_id
            WHERE members.id = $1
            "#,
        )
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load member context '{member_id}': {error}"
            ))
        })?;

        row.map(MemberContext::try_from).transpose()
    }

    pub(super) async fn find_member_impl(
        &self,
        member_id: MemberId,
    ) -> AppResult<Option<MemberRecord>> {
        let row = sqlx::query_as::<_, MemberRow>(MEMBER_SELECT)
            .bind(member_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to load member '{member_id}': {error}"))
            })?;

        row.map(MemberRecord::try_from).transpose()
    }

    pub(super) async fn find_branch_impl(&self, branch_id: BranchId) -> AppResult<Option<BranchRef>> {
        let row = sqlx::query_as::<_, BranchRow>(
            r#"
            SELECT id, church_id
            FROM branches
            WHERE id = $1
            "#,
        )
        .bind(branch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load branch: {error}")))?;

        Ok(row.map(|row| BranchRef {
            branch_id: BranchId::from_uuid(row.id),
            church_id: ChurchId::from_uuid(row.church_id),
        }))
    }

    pub(super) async fn find_position_impl(
        &self,
        church_id: ChurchId,
        position_id: PositionId,
    ) -> AppResult<Option<Position>> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            SELECT id, name
            FROM positions
            WHERE church_id = $1 AND id = $2
            "#,
        )
        .bind(church_id.as_uuid())
        .bind(position_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load position: {error}")))?;

        Ok(row.map(|row| Position {
            id: PositionId::from_uuid(row.id),
            name: row.name,
        }))
    }
}
