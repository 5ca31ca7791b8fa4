use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

mod conversions;


/// Incoming payload for member creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-member-request.ts"
)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub branch_id: String,
    #[serde(default)]
    #[ts(optional)]
    pub phone: Option<String>,
}

/// Incoming payload for member field edits.
///
/// Absent keys leave a field untouched. For clearable fields an explicit
/// `null` or an empty string clears the stored value.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-member-request.ts"
)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[ts(optional)]
    pub position_id: Option<Option<String>>,
}

/// Incoming payload for role changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-role-request.ts"
)]
pub struct ChangeRoleRequest {
    pub role: String,
}

/// Incoming payload for permission replacement.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-permissions-request.ts"
)]
pub struct AssignPermissionsRequest {
    pub permissions: Vec<String>,
}

/// API representation of a position.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/position-response.ts"
)]
pub struct PositionResponse {
    pub id: String,
    pub name: String,
}

/// API representation of a member.
///
/// Optional fields always serialize, as `null` when unset.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub id: String,
    pub church_id: String,
    pub branch_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub birth_date: Option<String>,
    pub position_id: Option<String>,
    pub position: Option<PositionResponse>,
}

/// Result of a permission replacement.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-assignment-response.ts"
)]
pub struct PermissionAssignmentResponse {
    pub added: usize,
    pub permissions: Vec<String>,
}

// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
