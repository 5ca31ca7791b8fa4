use super::*;

impl PostgresMemberRepository {
    pub(super) async fn update_member_role_impl(
        &self,
        member_id: MemberId,
        role: Role,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE members
            SET role = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(role.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update member role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "member '{member_id}' was not found"
            )));
        }

        write_permissions(&mut transaction, member_id, &PermissionSet::for_role(role)).await?;
        commit(transaction, member_id).await
    }

    pub(super) async fn replace_member_permissions_impl(
        &self,
        member_id: MemberId,
        permissions: &PermissionSet,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM members
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(member_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock member: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))?;

        write_permissions(&mut transaction, member_id, permissions).await?;
        commit(transaction, member_id).await
    }
}

/// Deletes and re-inserts the permission rows of one member inside `transaction`.
///
/// Readers outside the transaction observe either the old or the new set.
pub(super) async fn write_permissions(
    transaction: &mut Transaction<'_, Postgres>,
    member_id: MemberId,
    permissions: &PermissionSet,
) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM member_permissions
        WHERE member_id = $1
        "#,
    )
    .bind(member_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to clear permissions: {error}")))?;

    let values: Vec<String> = permissions
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect();

    sqlx::query(
        r#"
        INSERT INTO member_permissions (member_id, permission)
        SELECT $1, UNNEST($2::text[])
        "#,
    )
    .bind(member_id.as_uuid())
    .bind(values)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to persist permissions: {error}")))?;

    Ok(())
}

pub(super) async fn commit(
    transaction: Transaction<'_, Postgres>,
    member_id: MemberId,
) -> AppResult<()> {
    transaction.commit().await.map_err(|error| {
        warn!(%member_id, %error, "member transaction failed to commit");
        AppError::Internal(format!("failed to commit transaction: {error}"))
    })
}
