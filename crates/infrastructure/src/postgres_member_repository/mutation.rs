use super::*;

impl PostgresMemberRepository {
    pub(super) async fn create_member_impl(
        &self,
        branch: BranchRef,
        input: NewMember,
        permissions: PermissionSet,
    ) -> AppResult<MemberRecord> {
        let member_id = MemberId::new();
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO members (id, branch_id, name, email, role, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(branch.branch_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.email.as_str())
        .bind(input.role.as_str())
        .bind(input.phone.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_email_conflict(error, input.email.as_str()))?;

        write_permissions(&mut transaction, member_id, &permissions).await?;
        commit(transaction, member_id).await?;

        Ok(MemberRecord {
            id: member_id,
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
        })
    }

    pub(super) async fn update_member_fields_impl(
        &self,
        member_id: MemberId,
        changes: MemberFieldChanges,
    ) -> AppResult<MemberRecord> {
        let mut transaction = self.begin().await?;

        let statement = format!("{MEMBER_SELECT} FOR UPDATE OF members");
        let row = sqlx::query_as::<_, MemberRow>(statement.as_str())
            .bind(member_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to lock member '{member_id}': {error}"))
            })?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))?;
        let mut record = MemberRecord::try_from(row)?;

        let position = match changes.position_id {
            Some(Some(position_id)) => Some(
                sqlx::query_as::<_, PositionRow>(
                    r#"
                    SELECT id, name
                    FROM positions
                    WHERE church_id = $1 AND id = $2
                    "#,
                )
                .bind(record.branch.church_id.as_uuid())
                .bind(position_id.as_uuid())
                .fetch_optional(&mut *transaction)
                .await
                .map_err(|error| AppError::Internal(format!("failed to load position: {error}")))?
                .map(|row| Position {
                    id: PositionId::from_uuid(row.id),
                    name: row.name,
                })
                .ok_or_else(|| {
                    AppError::Validation(format!("position '{position_id}' was not found"))
                })?,
            ),
            _ => None,
        };

        changes.apply_to(&mut record, position);

        sqlx::query(
            r#"
            UPDATE members
            SET
                name = $2,
                email = $3,
                phone = $4,
                address = $5,
                avatar_url = $6,
                birth_date = $7,
                position_id = $8,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(record.name.as_str())
        .bind(record.email.as_str())
        .bind(record.phone.as_deref())
        .bind(record.address.as_deref())
        .bind(record.avatar_url.as_deref())
        .bind(record.birth_date)
        .bind(record.position_id().map(|position_id| position_id.as_uuid()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_email_conflict(error, record.email.as_str()))?;

        commit(transaction, member_id).await?;

        Ok(record)
    }
}
