use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ecclesia_core::AppError;
use serde::{Deserialize, Serialize};

/// Member role, totally ordered by seniority.
///
/// `Member < Coordinator < AdminFilial < AdminGeral`. Ordering goes through
/// [`Role::rank`] so declaration order never leaks into comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular congregation member.
    #[serde(rename = "MEMBER")]
    Member,
    /// Ministry or cell coordinator.
    #[serde(rename = "COORDINATOR")]
    Coordinator,
    /// Administrator of a single branch.
    #[serde(rename = "ADMINFILIAL")]
    AdminFilial,
    /// Administrator of the whole church.
    #[serde(rename = "ADMINGERAL")]
    AdminGeral,
}

impl Role {
    /// Returns a rank that strictly increases with seniority.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Coordinator => 1,
            Self::AdminFilial => 2,
            Self::AdminGeral => 3,
        }
    }

    /// Returns whether this role is strictly senior to `other`.
    #[must_use]
    pub const fn is_senior_to(self, other: Self) -> bool {
        self.rank() > other.rank()
    }

    /// Returns whether this role is the same as or senior to `other`.
    #[must_use]
    pub const fn is_same_or_senior_to(self, other: Self) -> bool {
        self.rank() >= other.rank()
    }

    /// Returns whether the role administers a branch or the whole church.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::AdminFilial | Self::AdminGeral)
    }

    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Coordinator => "COORDINATOR",
            Self::AdminFilial => "ADMINFILIAL",
            Self::AdminGeral => "ADMINGERAL",
        }
    }

    /// Returns all roles from most junior to most senior.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Member,
            Role::Coordinator,
            Role::AdminFilial,
            Role::AdminGeral,
        ];

        ALL
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MEMBER" => Ok(Self::Member),
            "COORDINATOR" => Ok(Self::Coordinator),
            "ADMINFILIAL" => Ok(Self::AdminFilial),
            "ADMINGERAL" => Ok(Self::AdminGeral),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}
