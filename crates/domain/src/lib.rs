//! Domain entities and authorization rules for church members.

#![forbid(unsafe_code)]

pub mod access;
mod member;
pub mod member_policy;
mod role;
mod security;

pub use member::{
    BranchId, BranchRef, EmailAddress, MemberContext, MemberFieldChanges, MemberId, MemberRecord,
    NewMember, Position, PositionId, Scope,
};
pub use member_policy::{
    AccessDecision, AccessDenial, DenialReason, PrivilegeChange, RoleChangePolicy,
};
pub use role::Role;
pub use security::{AuditAction, FLOOR_PERMISSION, Permission, PermissionSet};
