//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_member_repository;
mod postgres_audit_repository;
mod postgres_member_repository;

pub use in_memory_member_repository::InMemoryMemberRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_member_repository::PostgresMemberRepository;
