use chrono::NaiveDate;
use ecclesia_application::PermissionAssignment;
use ecclesia_core::{AppError, NonEmptyString};
use ecclesia_domain::{
    BranchId, EmailAddress, MemberFieldChanges, MemberRecord, NewMember, PositionId, Role,
};
use uuid::Uuid;

use super::{
    CreateMemberRequest, MemberResponse, PermissionAssignmentResponse, PositionResponse,
    UpdateMemberRequest,
};

impl From<MemberRecord> for MemberResponse {
    fn from(value: MemberRecord) -> Self {
        Self {
            id: value.id.to_string(),
            church_id: value.branch.church_id.to_string(),
            branch_id: value.branch.branch_id.to_string(),
            name: value.name,
            email: value.email.into(),
            role: value.role.as_str().to_owned(),
            permissions: value
                .permissions
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            phone: value.phone,
            address: value.address,
            avatar_url: value.avatar_url,
            birth_date: value
                .birth_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
            position_id: value.position.as_ref().map(|position| position.id.to_string()),
            position: value.position.map(|position| PositionResponse {
                id: position.id.to_string(),
                name: position.name,
            }),
        }
    }
}

impl From<PermissionAssignment> for PermissionAssignmentResponse {
    fn from(value: PermissionAssignment) -> Self {
        Self {
            added: value.added,
            permissions: value
                .permissions
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

impl TryFrom<CreateMemberRequest> for NewMember {
    type Error = AppError;

    fn try_from(value: CreateMemberRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: NonEmptyString::new(value.name)?,
            email: EmailAddress::new(value.email)?,
            role: Role::from_transport(value.role.as_str())?,
            branch_id: BranchId::from_uuid(parse_uuid("branchId", value.branch_id.as_str())?),
            phone: value.phone.and_then(blank_to_none),
        })
    }
}

impl TryFrom<UpdateMemberRequest> for MemberFieldChanges {
    type Error = AppError;

    fn try_from(value: UpdateMemberRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(NonEmptyString::new).transpose()?,
            email: value.email.map(EmailAddress::new).transpose()?,
            phone: value.phone.map(|phone| phone.and_then(blank_to_none)),
            address: value.address.map(|address| address.and_then(blank_to_none)),
            avatar_url: value.avatar_url.map(|url| url.and_then(blank_to_none)),
            birth_date: value
                .birth_date
                .map(|date| date.and_then(blank_to_none).map(parse_birth_date).transpose())
                .transpose()?,
            position_id: value
                .position_id
                .map(|id| {
                    id.and_then(blank_to_none)
                        .map(|id| parse_uuid("positionId", id.as_str()).map(PositionId::from_uuid))
                        .transpose()
                })
                .transpose()?,
        })
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
}

fn parse_birth_date(value: String) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.as_str(), "%Y-%m-%d").map_err(|error| {
        AppError::Validation(format!(
            "birthDate must be formatted as YYYY-MM-DD, got '{value}': {error}"
        ))
    })
}
