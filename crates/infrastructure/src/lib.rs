//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_store;
mod postgres_announcement_repository;
mod postgres_issue_repository;
mod postgres_journal_repository;
mod postgres_review_repository;
mod postgres_role_repository;
mod postgres_submission_repository;
mod postgres_user_repository;

#[cfg(test)]
mod postgres_test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_store::InMemoryStore;
pub use postgres_announcement_repository::PostgresAnnouncementRepository;
pub use postgres_issue_repository::PostgresIssueRepository;
pub use postgres_journal_repository::PostgresJournalRepository;
pub use postgres_review_repository::PostgresReviewRepository;
pub use postgres_role_repository::{PostgresRoleGrantRepository, PostgresUserGroupRepository};
pub use postgres_submission_repository::PostgresSubmissionRepository;
pub use postgres_user_repository::PostgresUserRepository;
