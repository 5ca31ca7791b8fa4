//! Member records, identifiers and the actor/target scope relation.

use chrono::NaiveDate;
use ecclesia_core::{AppError, AppResult, ChurchId, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PermissionSet, Role};

/// Unique identifier for a member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Creates a new random member identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a member identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a church branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(Uuid);

impl BranchId {
    /// Creates a new random branch identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a branch identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a church position (ministry office).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(Uuid);

impl PositionId {
    /// Creates a new random position identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a position identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PositionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Requires exactly one `@`, a non-empty local part and a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Branch reference used to place new members; the church is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch identifier.
    pub branch_id: BranchId,
    /// Church owning the branch.
    pub church_id: ChurchId,
}

/// Church position a member may occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier.
    pub id: PositionId,
    /// Display name, e.g. "Diácono".
    pub name: String,
}

/// Authorization snapshot of one member: who they are, what they hold, where they sit.
///
/// Used both for the actor and for the target of an operation. Snapshots are
/// loaded fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberContext {
    id: MemberId,
    role: Role,
    permissions: PermissionSet,
    branch: BranchRef,
}

impl MemberContext {
    /// Creates a snapshot from persisted member state.
    #[must_use]
    pub fn new(id: MemberId, role: Role, permissions: PermissionSet, branch: BranchRef) -> Self {
        Self {
            id,
            role,
            permissions,
            branch,
        }
    }

    /// Returns the member identifier.
    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the member role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the materialized permission set.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns the member branch.
    #[must_use]
    pub fn branch_id(&self) -> BranchId {
        self.branch.branch_id
    }

    /// Returns the member church, derived through the branch.
    #[must_use]
    pub fn church_id(&self) -> ChurchId {
        self.branch.church_id
    }
}

/// Relationship between an actor and a target member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// Actor and target are the same member.
    SameMember,
    /// Different members in the same branch.
    SameBranch,
    /// Same church, different branches.
    SameChurchDifferentBranch,
    /// Different churches.
    DifferentChurch,
}

impl Scope {
    /// Derives the scope between an actor and a target.
    #[must_use]
    pub fn between(actor: &MemberContext, target: &MemberContext) -> Self {
        if actor.id() == target.id() {
            Self::SameMember
        } else if actor.church_id() != target.church_id() {
            Self::DifferentChurch
        } else if actor.branch_id() == target.branch_id() {
            Self::SameBranch
        } else {
            Self::SameChurchDifferentBranch
        }
    }
}

/// Full persisted member projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// Member identifier.
    pub id: MemberId,
    /// Branch and church the member belongs to.
    pub branch: BranchRef,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: EmailAddress,
    /// Current role.
    pub role: Role,
    /// Materialized permissions.
    pub permissions: PermissionSet,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional avatar URL.
    pub avatar_url: Option<String>,
    /// Optional birth date.
    pub birth_date: Option<NaiveDate>,
    /// Position currently held, if any.
    pub position: Option<Position>,
}

impl MemberRecord {
    /// Returns the authorization snapshot of this record.
    #[must_use]
    pub fn context(&self) -> MemberContext {
        MemberContext::new(self.id, self.role, self.permissions.clone(), self.branch)
    }

    /// Returns the held position identifier, if any.
    #[must_use]
    pub fn position_id(&self) -> Option<PositionId> {
        self.position.as_ref().map(|position| position.id)
    }
}

/// Typed field-edit payload.
///
/// Outer `None` leaves a field untouched; for clearable fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFieldChanges {
    /// New display name.
    pub name: Option<NonEmptyString>,
    /// New login email.
    pub email: Option<EmailAddress>,
    /// New or cleared phone number.
    pub phone: Option<Option<String>>,
    /// New or cleared address.
    pub address: Option<Option<String>>,
    /// New or cleared avatar URL.
    pub avatar_url: Option<Option<String>>,
    /// New or cleared birth date.
    pub birth_date: Option<Option<NaiveDate>>,
    /// New or cleared position.
    pub position_id: Option<Option<PositionId>>,
}

impl MemberFieldChanges {
    /// Returns whether the payload changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.avatar_url.is_none()
            && self.birth_date.is_none()
            && self.position_id.is_none()
    }

    /// Returns whether the payload touches the email.
    #[must_use]
    pub fn touches_email(&self) -> bool {
        self.email.is_some()
    }

    /// Returns whether the payload touches the position.
    #[must_use]
    pub fn touches_position(&self) -> bool {
        self.position_id.is_some()
    }

    /// Returns the names of the touched fields in payload order.
    #[must_use]
    pub fn touched_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("phone", self.phone.is_some()),
            ("address", self.address.is_some()),
            ("avatarUrl", self.avatar_url.is_some()),
            ("birthDate", self.birth_date.is_some()),
            ("positionId", self.position_id.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, touched)| touched.then_some(field))
        .collect()
    }

    /// Applies the changes to a record.
    pub fn apply_to(self, record: &mut MemberRecord, position: Option<Position>) {
        if let Some(name) = self.name {
            record.name = name.into();
        }
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(phone) = self.phone {
            record.phone = phone;
        }
        if let Some(address) = self.address {
            record.address = address;
        }
        if let Some(avatar_url) = self.avatar_url {
            record.avatar_url = avatar_url;
        }
        if let Some(birth_date) = self.birth_date {
            record.birth_date = birth_date;
        }
        if self.position_id.is_some() {
            record.position = position;
        }
    }
}

/// Input for creating a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    /// Display name.
    pub name: NonEmptyString,
    /// Login email.
    pub email: EmailAddress,
    /// Initial role.
    pub role: Role,
    /// Branch the member joins.
    pub branch_id: BranchId,
    /// Optional phone number.
    pub phone: Option<String>,
}
