use folio_application::{
    AnnouncementService, IssueService, JournalService, ReviewService, RoleResolver,
    RoleSyncService, SubmissionService, UserService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub role_resolver: RoleResolver,
    pub role_sync_service: RoleSyncService,
    pub journal_service: JournalService,
    pub announcement_service: AnnouncementService,
    pub issue_service: IssueService,
    pub submission_service: SubmissionService,
    pub review_service: ReviewService,
    pub frontend_url: String,
    pub bootstrap_token: String,
    /// Absent when the state runs over in-memory adapters.
    pub postgres_pool: Option<PgPool>,
}
