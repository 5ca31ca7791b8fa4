use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ChurchId;

/// Member identity persisted in the authenticated session.
///
/// Carries only what authentication established. Role and permissions are
/// not carried here; they are reloaded from storage for every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    member_id: Uuid,
    display_name: String,
    email: String,
    church_id: ChurchId,
}

impl MemberIdentity {
    /// Creates a member identity from authentication data.
    #[must_use]
    pub fn new(
        member_id: Uuid,
        display_name: impl Into<String>,
        email: impl Into<String>,
        church_id: ChurchId,
    ) -> Self {
        Self {
            member_id,
            display_name: display_name.into(),
            email: email.into(),
            church_id,
        }
    }

    /// Returns the authenticated member identifier.
    #[must_use]
    pub fn member_id(&self) -> Uuid {
        self.member_id
    }

    /// Returns the display name for the current member.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the church the session was opened for.
    #[must_use]
    pub fn church_id(&self) -> ChurchId {
        self.church_id
    }
}
