//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod journal;
mod review;
mod role;
mod submission;
mod user;

pub use journal::{DEFAULT_JOURNAL_SETTINGS, JOURNAL_PATH_MAX_LENGTH, JournalPath};
pub use review::{ReviewRecommendation, ReviewStatus};
pub use role::{
    LEGACY_SITE_CONTEXT_ID, LegacyRoleId, RoleContext, RolePath, legacy_role_ids_for_paths,
};
pub use submission::{PublicationStatus, SubmissionStatus, WorkflowStage};
pub use user::{
    EMAIL_MAX_LENGTH, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, validate_password,
};
