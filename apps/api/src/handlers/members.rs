use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use ecclesia_core::{AppError, MemberIdentity};
use ecclesia_domain::{MemberFieldChanges, MemberId, NewMember, PermissionSet, Role};
use tracing::info;
use uuid::Uuid;

use crate::dto::{
    AssignPermissionsRequest, ChangeRoleRequest, CreateMemberRequest, MemberResponse,
    PermissionAssignmentResponse, UpdateMemberRequest,
};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn get_member_handler(
    State(state): State<AppState>,
    Extension(member): Extension<MemberIdentity>,
    Path(member_id): Path<String>,
) -> ApiResult<Json<MemberResponse>> {
    let member_id = parse_member_id(member_id.as_str())?;
    let record = state.member_service.get_member(&member, member_id).await?;

    Ok(Json(MemberResponse::from(record)))
}

pub async fn create_member_handler(
    State(state): State<AppState>,
    Extension(member): Extension<MemberIdentity>,
    ApiJson(payload): ApiJson<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let input = NewMember::try_from(payload)?;
    let record = state.member_service.create_member(&member, input).await?;

    info!(
        actor = %member.member_id(),
        member_id = %record.id,
        role = %record.role,
        "member created"
    );

    Ok((StatusCode::CREATED, Json(MemberResponse::from(record))))
}

pub async fn update_member_handler(
    State(state): State<AppState>,
    Extension(member): Extension<MemberIdentity>,
    Path(member_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member_id = parse_member_id(member_id.as_str())?;
    let changes = MemberFieldChanges::try_from(payload)?;
    let fields = changes.touched_fields().join(",");
    let record = state
        .member_service
        .update_member(&member, member_id, changes)
        .await?;

    info!(actor = %member.member_id(), %member_id, %fields, "member updated");

    Ok(Json(MemberResponse::from(record)))
}

pub async fn change_member_role_handler(
    State(state): State<AppState>,
    Extension(member): Extension<MemberIdentity>,
    Path(member_id): Path<String>,
    ApiJson(payload): ApiJson<ChangeRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member_id = parse_member_id(member_id.as_str())?;
    let role = Role::from_transport(payload.role.as_str())?;
    let record = state
        .member_service
        .change_member_role(&member, member_id, role)
        .await?;

    info!(actor = %member.member_id(), %member_id, %role, "member role changed");

    Ok(Json(MemberResponse::from(record)))
}

pub async fn assign_member_permissions_handler(
    State(state): State<AppState>,
    Extension(member): Extension<MemberIdentity>,
    Path(member_id): Path<String>,
    ApiJson(payload): ApiJson<AssignPermissionsRequest>,
) -> ApiResult<Json<PermissionAssignmentResponse>> {
    let member_id = parse_member_id(member_id.as_str())?;
    let requested = PermissionSet::from_transport(&payload.permissions)?;
    let assignment = state
        .member_service
        .assign_member_permissions(&member, member_id, requested)
        .await?;

    info!(
        actor = %member.member_id(),
        %member_id,
        added = assignment.added,
        "member permissions replaced"
    );

    Ok(Json(PermissionAssignmentResponse::from(assignment)))
}

fn parse_member_id(value: &str) -> Result<MemberId, AppError> {
    Uuid::parse_str(value)
        .map(MemberId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid member id '{value}': {error}")))
}
