use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use ecclesia_application::{AuditEvent, AuditRepository, MemberRepository, MemberService};
use ecclesia_core::{AppError, AppResult, ChurchId, MemberIdentity};
use ecclesia_domain::{
    AuditAction, BranchId, BranchRef, EmailAddress, MemberId, MemberRecord, PermissionSet, Role,
    RoleChangePolicy,
};
use ecclesia_infrastructure::InMemoryMemberRepository;
use serde_json::json;
use tokio::sync::Mutex;

use super::{
    assign_member_permissions_handler, change_member_role_handler, create_member_handler,
    get_member_handler, update_member_handler,
};
use crate::dto::{
    AssignPermissionsRequest, ChangeRoleRequest, CreateMemberRequest, UpdateMemberRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[derive(Default)]
struct SharedAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for SharedAuditSink {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

struct Harness {
    state: AppState,
    repository: Arc<InMemoryMemberRepository>,
    audit: Arc<SharedAuditSink>,
    main: BranchRef,
    annex: BranchRef,
}

impl Harness {
    async fn new() -> Self {
        let church_id = ChurchId::new();
        let main = BranchRef {
            branch_id: BranchId::new(),
            church_id,
        };
        let annex = BranchRef {
            branch_id: BranchId::new(),
            church_id,
        };
        let repository = Arc::new(InMemoryMemberRepository::new());
        repository.insert_branch(main).await;
        repository.insert_branch(annex).await;
        let audit = Arc::new(SharedAuditSink::default());

        let state = AppState {
            member_service: MemberService::new(
                repository.clone(),
                audit.clone(),
                RoleChangePolicy::default(),
            ),
            frontend_url: "http://localhost:3000".to_owned(),
        };

        Self {
            state,
            repository,
            audit,
            main,
            annex,
        }
    }

    async fn seed(&self, name: &str, role: Role, branch: BranchRef) -> MemberRecord {
        let record = MemberRecord {
            id: MemberId::new(),
            branch,
            name: name.to_owned(),
            email: EmailAddress::new(format!("{}@igreja.org", name.to_lowercase()))
                .unwrap_or_else(|_| unreachable!()),
            role,
            permissions: PermissionSet::for_role(role),
            phone: None,
            address: None,
            avatar_url: None,
            birth_date: None,
            position: None,
        };
        self.repository
            .insert_member(record.clone())
            .await
            .unwrap_or_else(|_| unreachable!());
        record
    }

    fn identity(record: &MemberRecord) -> Extension<MemberIdentity> {
        Extension(MemberIdentity::new(
            record.id.as_uuid(),
            record.name.clone(),
            record.email.as_str().to_owned(),
            record.branch.church_id,
        ))
    }

    async fn audit_actions(&self) -> Vec<AuditAction> {
        self.audit
            .events
            .lock()
            .await
            .iter()
            .map(|event| event.action)
            .collect()
    }
}

fn forbidden_message<T>(result: Result<T, ApiError>) -> Option<String> {
    match result {
        Err(ApiError(AppError::Forbidden(message))) => Some(message),
        _ => None,
    }
}

#[tokio::test]
async fn name_only_edit_returns_stable_null_keys() {
    let harness = Harness::new().await;
    let admin = harness.seed("Paulo", Role::AdminFilial, harness.main).await;
    let target = harness.seed("Lidia", Role::Member, harness.main).await;

    let response = update_member_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(UpdateMemberRequest {
            name: Some("Lídia de Tiatira".to_owned()),
            ..UpdateMemberRequest::default()
        }),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("field edit should succeed");
    };
    let body = serde_json::to_value(response).unwrap_or_else(|_| unreachable!());

    assert_eq!(body["name"], json!("Lídia de Tiatira"));
    for key in ["phone", "address", "avatarUrl", "positionId", "position"] {
        assert_eq!(body.get(key), Some(&serde_json::Value::Null), "{key}");
    }
    assert_eq!(harness.audit_actions().await, vec![AuditAction::MemberUpdated]);
}

#[tokio::test]
async fn branch_admin_cannot_edit_other_branch() {
    let harness = Harness::new().await;
    let admin = harness.seed("Paulo", Role::AdminFilial, harness.main).await;
    let target = harness.seed("Silas", Role::Member, harness.annex).await;

    let result = update_member_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(UpdateMemberRequest {
            name: Some("Silvano".to_owned()),
            ..UpdateMemberRequest::default()
        }),
    )
    .await;

    assert_eq!(
        forbidden_message(result),
        Some("Você só pode editar membros da sua filial.".to_owned())
    );
    assert!(harness.audit_actions().await.is_empty());
}

#[tokio::test]
async fn restricted_permission_for_plain_member_is_forbidden() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;
    let target = harness.seed("Marcos", Role::Member, harness.annex).await;

    let result = assign_member_permissions_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(AssignPermissionsRequest {
            permissions: vec!["finances_manage".to_owned()],
        }),
    )
    .await;

    assert!(forbidden_message(result).is_some());
    let stored = harness.repository.find_member(target.id).await;
    assert_eq!(
        stored.ok().flatten().map(|record| record.permissions),
        Some(PermissionSet::for_role(Role::Member))
    );
}

#[tokio::test]
async fn permission_assignment_reports_count_and_keeps_floor() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;
    let target = harness
        .seed("Timoteo", Role::Coordinator, harness.annex)
        .await;

    let response = assign_member_permissions_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(AssignPermissionsRequest {
            permissions: vec!["events_manage".to_owned(), "finances_manage".to_owned()],
        }),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("assignment should succeed");
    };
    assert_eq!(response.added, 3);
    assert_eq!(
        response.permissions,
        vec!["members_view", "finances_manage", "events_manage"]
    );
    assert_eq!(
        harness.audit_actions().await,
        vec![AuditAction::MemberPermissionsReplaced]
    );
}

#[tokio::test]
async fn unknown_permission_name_is_a_validation_error() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;
    let target = harness.seed("Timoteo", Role::Coordinator, harness.main).await;

    let result = assign_member_permissions_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(AssignPermissionsRequest {
            permissions: vec!["members_delete".to_owned()],
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn role_change_resets_permissions_for_new_role() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;
    let target = harness
        .seed("Barnabe", Role::AdminFilial, harness.annex)
        .await;

    let response = change_member_role_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(ChangeRoleRequest {
            role: "COORDINATOR".to_owned(),
        }),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("role change should succeed");
    };
    assert_eq!(response.role, "COORDINATOR");
    assert_eq!(response.permissions, vec!["members_view"]);
    assert_eq!(
        harness.audit_actions().await,
        vec![AuditAction::MemberRoleChanged]
    );
}

#[tokio::test]
async fn unknown_role_value_is_a_validation_error() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;
    let target = harness.seed("Barnabe", Role::Member, harness.main).await;

    let result = change_member_role_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path(target.id.to_string()),
        ApiJson(ChangeRoleRequest {
            role: "BISHOP".to_owned(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn create_member_places_member_in_branch() {
    let harness = Harness::new().await;
    let admin = harness.seed("Paulo", Role::AdminFilial, harness.main).await;

    let response = create_member_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        ApiJson(CreateMemberRequest {
            name: "Priscila".to_owned(),
            email: "priscila@igreja.org".to_owned(),
            role: "COORDINATOR".to_owned(),
            branch_id: harness.main.branch_id.to_string(),
            phone: None,
        }),
    )
    .await;

    let Ok((status, Json(response))) = response else {
        panic!("creation should succeed");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response.branch_id, harness.main.branch_id.to_string());
    assert_eq!(response.permissions, vec!["members_view"]);
    assert_eq!(
        harness.audit_actions().await,
        vec![AuditAction::MemberCreated]
    );
}

#[tokio::test]
async fn get_member_rejects_malformed_id() {
    let harness = Harness::new().await;
    let admin = harness.seed("Pedro", Role::AdminGeral, harness.main).await;

    let result = get_member_handler(
        State(harness.state.clone()),
        Harness::identity(&admin),
        Path("membro-1".to_owned()),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn get_member_returns_same_church_member() {
    let harness = Harness::new().await;
    let viewer = harness.seed("Lucas", Role::Member, harness.main).await;
    let target = harness.seed("Tito", Role::Coordinator, harness.annex).await;

    let response = get_member_handler(
        State(harness.state.clone()),
        Harness::identity(&viewer),
        Path(target.id.to_string()),
    )
    .await;

    let Ok(Json(response)) = response else {
        panic!("read should succeed");
    };
    assert_eq!(response.id, target.id.to_string());
    assert_eq!(response.role, "COORDINATOR");
}
