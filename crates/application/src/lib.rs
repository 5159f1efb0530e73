//! Application services and ports.

#![forbid(unsafe_code)]

mod announcement_service;
mod issue_service;
mod journal_service;
mod review_service;
mod role_ports;
mod role_resolver;
mod role_sync_service;
mod submission_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use announcement_service::{
    Announcement, AnnouncementChanges, AnnouncementQuery, AnnouncementRepository,
    AnnouncementService, CreateAnnouncementInput, NewAnnouncement, UpdateAnnouncementInput,
};
pub use issue_service::{Issue, IssueChanges, IssueFields, IssueRepository, IssueService};
pub use journal_service::{
    CreateJournalInput, Journal, JournalChanges, JournalRepository, JournalService,
    JournalSetting, NewJournal, UpdateJournalInput,
};
pub use review_service::{
    NewReviewAssignment, ReviewAssignment, ReviewRepository, ReviewResponse, ReviewService,
    ReviewTransition,
};
pub use role_ports::{
    RoleGrant, RoleGrantRepository, UserGroup, UserGroupMembership, UserGroupRepository,
};
pub use role_resolver::{RoleResolver, UserRoleSummary};
pub use role_sync_service::{RoleSyncReport, RoleSyncService};
pub use submission_service::{
    CreatePublicationInput, CreateSubmissionInput, NewPublication, NewSubmission, Publication,
    Submission, SubmissionChanges, SubmissionRepository, SubmissionService,
    SubmissionWithPublications,
};
pub use user_service::{
    NewUserRecord, PasswordHasher, RegisterUserInput, UserAccount, UserCredentials,
    UserRepository, UserService,
};
