//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod member_ports;
mod member_service;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use member_ports::{MemberRepository, PermissionAssignment};
pub use member_service::MemberService;
