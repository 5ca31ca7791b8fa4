use ecclesia_application::MemberService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub member_service: MemberService,
    pub frontend_url: String,
}
