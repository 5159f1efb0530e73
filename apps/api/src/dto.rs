mod auth;
mod common;
mod content;
mod journals;
mod roles;
mod users;
mod workflow;

pub use auth::{BootstrapRequest, BootstrapResponse, LoginRequest, UserIdentityResponse};
pub use common::{ApiEnvelope, ApiJson, HealthResponse, parse_timestamp};
pub use content::{
    AnnouncementListQuery, AnnouncementResponse, CreateAnnouncementRequest, IssueRequest,
    IssueResponse, UpdateAnnouncementRequest,
};
pub use journals::{
    CreateJournalRequest, JournalResponse, JournalSettingResponse, UpdateJournalRequest,
};
pub use roles::{
    JournalRoleCheckQuery, RoleChangeRequest, RoleCheckResponse, RoleSyncReportResponse,
    SiteRoleCheckQuery, UserRolesResponse,
};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse};
pub use workflow::{
    AssignReviewerRequest, CompleteReviewRequest, CreatePublicationRequest,
    CreateSubmissionRequest, PublicationResponse, RespondToReviewRequest,
    ReviewAssignmentResponse, SubmissionDetailResponse, SubmissionResponse,
    UpdateSubmissionRequest,
};
