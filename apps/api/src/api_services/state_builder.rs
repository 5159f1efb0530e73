use std::sync::Arc;

use folio_application::{
    AnnouncementRepository, AnnouncementService, IssueRepository, IssueService,
    JournalRepository, JournalService, PasswordHasher, ReviewRepository, ReviewService,
    RoleGrantRepository, RoleResolver, RoleSyncService, SubmissionRepository, SubmissionService,
    UserGroupRepository, UserRepository, UserService,
};
use folio_infrastructure::{
    Argon2PasswordHasher, PostgresAnnouncementRepository, PostgresIssueRepository,
    PostgresJournalRepository, PostgresReviewRepository, PostgresRoleGrantRepository,
    PostgresSubmissionRepository, PostgresUserGroupRepository, PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Every repository port the services need.
struct RepositorySet {
    user_repository: Arc<dyn UserRepository>,
    grant_repository: Arc<dyn RoleGrantRepository>,
    group_repository: Arc<dyn UserGroupRepository>,
    journal_repository: Arc<dyn JournalRepository>,
    announcement_repository: Arc<dyn AnnouncementRepository>,
    issue_repository: Arc<dyn IssueRepository>,
    submission_repository: Arc<dyn SubmissionRepository>,
    review_repository: Arc<dyn ReviewRepository>,
}

impl RepositorySet {
    fn postgres(pool: &PgPool) -> Self {
        Self {
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            grant_repository: Arc::new(PostgresRoleGrantRepository::new(pool.clone())),
            group_repository: Arc::new(PostgresUserGroupRepository::new(pool.clone())),
            journal_repository: Arc::new(PostgresJournalRepository::new(pool.clone())),
            announcement_repository: Arc::new(PostgresAnnouncementRepository::new(pool.clone())),
            issue_repository: Arc::new(PostgresIssueRepository::new(pool.clone())),
            submission_repository: Arc::new(PostgresSubmissionRepository::new(pool.clone())),
            review_repository: Arc::new(PostgresReviewRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    fn in_memory(store: Arc<folio_infrastructure::InMemoryStore>) -> Self {
        Self {
            user_repository: store.clone(),
            grant_repository: store.clone(),
            group_repository: store.clone(),
            journal_repository: store.clone(),
            announcement_repository: store.clone(),
            issue_repository: store.clone(),
            submission_repository: store.clone(),
            review_repository: store,
        }
    }
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    assemble(
        RepositorySet::postgres(&pool),
        Arc::new(Argon2PasswordHasher::new()),
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
        Some(pool),
    )
}

/// Builds the state over one shared in-memory store.
#[cfg(test)]
pub fn build_in_memory_app_state(
    store: Arc<folio_infrastructure::InMemoryStore>,
    frontend_url: &str,
    bootstrap_token: &str,
) -> AppState {
    assemble(
        RepositorySet::in_memory(store),
        Arc::new(Argon2PasswordHasher::new()),
        frontend_url.to_owned(),
        bootstrap_token.to_owned(),
        None,
    )
}

fn assemble(
    repositories: RepositorySet,
    password_hasher: Arc<dyn PasswordHasher>,
    frontend_url: String,
    bootstrap_token: String,
    postgres_pool: Option<PgPool>,
) -> AppState {
    let resolver = RoleResolver::new(
        repositories.grant_repository.clone(),
        repositories.group_repository.clone(),
    );
    let role_sync_service = RoleSyncService::new(
        resolver.clone(),
        repositories.grant_repository.clone(),
        repositories.group_repository.clone(),
        repositories.user_repository.clone(),
        repositories.journal_repository.clone(),
    );
    let user_service = UserService::new(
        repositories.user_repository,
        repositories.grant_repository,
        repositories.group_repository,
        password_hasher,
        resolver.clone(),
        role_sync_service.clone(),
    );
    let submission_service = SubmissionService::new(
        repositories.submission_repository,
        repositories.journal_repository.clone(),
        repositories.issue_repository.clone(),
        repositories.review_repository.clone(),
        resolver.clone(),
    );

    AppState {
        journal_service: JournalService::new(
            repositories.journal_repository.clone(),
            resolver.clone(),
        ),
        announcement_service: AnnouncementService::new(
            repositories.announcement_repository,
            resolver.clone(),
        ),
        issue_service: IssueService::new(
            repositories.issue_repository,
            repositories.journal_repository,
            resolver.clone(),
        ),
        review_service: ReviewService::new(
            repositories.review_repository,
            submission_service.clone(),
            resolver.clone(),
        ),
        submission_service,
        user_service,
        role_sync_service,
        role_resolver: resolver,
        frontend_url,
        bootstrap_token,
        postgres_pool,
    }
}
