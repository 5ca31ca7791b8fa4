mod common;
mod members;

pub use common::HealthResponse;
pub use members::{
    AssignPermissionsRequest, ChangeRoleRequest, CreateMemberRequest, MemberResponse,
    PermissionAssignmentResponse, PositionResponse, UpdateMemberRequest,
};

#[cfg(test)]
mod tests {
    use super::{
        AssignPermissionsRequest, ChangeRoleRequest, CreateMemberRequest, HealthResponse,
        MemberResponse, PermissionAssignmentResponse, PositionResponse, UpdateMemberRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateMemberRequest::export(&config)?;
        UpdateMemberRequest::export(&config)?;
        ChangeRoleRequest::export(&config)?;
        AssignPermissionsRequest::export(&config)?;
        PositionResponse::export(&config)?;
        MemberResponse::export(&config)?;
        PermissionAssignmentResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;

        Ok(())
    }
}
