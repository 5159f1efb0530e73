use std::sync::Arc;

use folio_application::{
    CreateJournalInput, CreatePublicationInput, CreateSubmissionInput, JournalService,
    RegisterUserInput, ReviewService, RoleResolver, RoleSyncService, SubmissionService,
    UserAccount, UserService,
};
use folio_core::{AppError, UserIdentity};
use folio_domain::{LegacyRoleId, PublicationStatus, RoleContext, RolePath};

use super::InMemoryStore;
use crate::Argon2PasswordHasher;

struct Services {
    store: Arc<InMemoryStore>,
    resolver: RoleResolver,
    role_sync: RoleSyncService,
    users: UserService,
    journals: JournalService,
    submissions: SubmissionService,
    reviews: ReviewService,
}

fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    let resolver = RoleResolver::new(store.clone(), store.clone());
    let role_sync = RoleSyncService::new(
        resolver.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let users = UserService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        resolver.clone(),
        role_sync.clone(),
    );
    let journals = JournalService::new(store.clone(), resolver.clone());
    let submissions = SubmissionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        resolver.clone(),
    );
    let reviews = ReviewService::new(store.clone(), submissions.clone(), resolver.clone());

    Services {
        store,
        resolver,
        role_sync,
        users,
        journals,
        submissions,
        reviews,
    }
}

fn registration(email: &str) -> RegisterUserInput {
    RegisterUserInput {
        email: email.to_owned(),
        display_name: "Ada Reviewer".to_owned(),
        password: "quarterly-proofs-42".to_owned(),
    }
}

async fn bootstrap(services: &Services) -> UserIdentity {
    let (admin, report) = services
        .users
        .bootstrap_site_admin(registration("admin@press.test"))
        .await
        .unwrap_or_else(|error| panic!("bootstrap failed: {error}"));
    assert!(report.is_complete());
    admin.identity()
}

async fn register(services: &Services, admin: &UserIdentity, email: &str) -> UserAccount {
    services
        .users
        .register_user(admin, registration(email))
        .await
        .unwrap_or_else(|error| panic!("registration failed: {error}"))
}

fn journal_input(path: &str) -> CreateJournalInput {
    CreateJournalInput {
        path: path.to_owned(),
        name: "Journal of Marginalia".to_owned(),
        description: Some("  Notes in the margins  ".to_owned()),
        enabled: true,
    }
}

#[tokio::test]
async fn created_journal_is_seeded_with_settings_and_default_groups() {
    let services = services();
    let admin = bootstrap(&services).await;

    let journal = services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    assert_eq!(journal.description.as_deref(), Some("Notes in the margins"));

    let settings = services
        .journals
        .list_journal_settings(&admin, journal.id)
        .await
        .unwrap_or_else(|error| panic!("settings failed: {error}"));
    let names: Vec<&str> = settings
        .iter()
        .map(|setting| setting.setting_name.as_str())
        .collect();
    assert_eq!(names, ["contactEmail", "description", "itemsPerPage", "name"]);

    let state = services.store.state.read().await;
    let default_groups = state
        .groups
        .values()
        .filter(|group| group.context == RoleContext::Journal(journal.id) && group.is_default)
        .count();
    assert_eq!(default_groups, RolePath::journal_defaults().len());
}

#[tokio::test]
async fn duplicate_journal_path_is_a_conflict() {
    let services = services();
    let admin = bootstrap(&services).await;

    services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let duplicate = services
        .journals
        .create_journal(&admin, journal_input("Marginalia"))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn grant_and_revoke_reach_both_role_stores() {
    let services = services();
    let admin = bootstrap(&services).await;
    let editor = register(&services, &admin, "editor@press.test").await;
    let journal = services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let context = RoleContext::Journal(journal.id);

    let granted = services
        .role_sync
        .grant_role(&admin, editor.id, RolePath::Editor, context)
        .await
        .unwrap_or_else(|error| panic!("grant failed: {error}"));
    assert!(granted.is_complete());
    assert!(
        services
            .resolver
            .has_user_journal_role(editor.id, journal.id, &["editor"])
            .await
    );

    // Granting into the seeded manager group must not create a second group.
    let state = services.store.state.read().await;
    let manager_groups = state
        .groups
        .values()
        .filter(|group| group.context == context && group.role_id == LegacyRoleId::MANAGER)
        .count();
    assert_eq!(manager_groups, 1);
    drop(state);

    let revoked = services
        .role_sync
        .revoke_role(&admin, editor.id, RolePath::Editor, context)
        .await
        .unwrap_or_else(|error| panic!("revoke failed: {error}"));
    assert_eq!(revoked.removed_grants, 1);
    assert_eq!(revoked.removed_memberships, 1);
    assert!(
        !services
            .resolver
            .has_user_journal_role(editor.id, journal.id, &["editor"])
            .await
    );
}

#[tokio::test]
async fn deleting_a_journal_removes_scoped_rows() {
    let services = services();
    let admin = bootstrap(&services).await;
    let author = register(&services, &admin, "author@press.test").await;
    let journal = services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    services
        .role_sync
        .grant_role(&admin, author.id, RolePath::Author, RoleContext::Journal(journal.id))
        .await
        .unwrap_or_else(|error| panic!("grant failed: {error}"));
    services
        .submissions
        .create_submission(
            &author.identity(),
            journal.id,
            CreateSubmissionInput {
                title: "On footnotes".to_owned(),
                abstract_text: None,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("submission failed: {error}"));

    services
        .journals
        .delete_journal(&admin, journal.id)
        .await
        .unwrap_or_else(|error| panic!("delete failed: {error}"));

    let summary = services
        .resolver
        .list_user_roles(author.id)
        .await
        .unwrap_or_else(|error| panic!("roles failed: {error}"));
    assert!(summary.grants.is_empty());
    assert!(summary.memberships.is_empty());

    let state = services.store.state.read().await;
    assert!(
        state
            .groups
            .values()
            .all(|group| group.context == RoleContext::Site)
    );
    assert!(state.submissions.is_empty());
    assert!(state.journal_settings.is_empty());
}

#[tokio::test]
async fn submission_without_publications_reports_none_until_one_is_added() {
    let services = services();
    let admin = bootstrap(&services).await;
    let author = register(&services, &admin, "author@press.test").await;
    let journal = services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    let submission = services
        .submissions
        .create_submission(
            &author.identity(),
            journal.id,
            CreateSubmissionInput {
                title: "On footnotes".to_owned(),
                abstract_text: Some("A short history.".to_owned()),
            },
        )
        .await
        .unwrap_or_else(|error| panic!("submission failed: {error}"));

    let found = services
        .submissions
        .get_submission(&author.identity(), submission.id)
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert!(!found.has_publications());
    assert!(found.current_publication().is_none());

    for _ in 0..2 {
        services
            .submissions
            .create_publication(
                &admin,
                submission.id,
                CreatePublicationInput {
                    title: None,
                    status: PublicationStatus::Draft,
                    issue_id: None,
                },
            )
            .await
            .unwrap_or_else(|error| panic!("publication failed: {error}"));
    }

    let found = services
        .submissions
        .get_submission(&author.identity(), submission.id)
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert_eq!(found.publications.len(), 2);
    assert_eq!(found.current_publication().map(|current| current.version), Some(2));
}

#[tokio::test]
async fn deleting_a_user_removes_their_reviews_and_roles() {
    let services = services();
    let admin = bootstrap(&services).await;
    let author = register(&services, &admin, "author@press.test").await;
    let reviewer = register(&services, &admin, "reviewer@press.test").await;
    let journal = services
        .journals
        .create_journal(&admin, journal_input("marginalia"))
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    services
        .role_sync
        .grant_role(&admin, reviewer.id, RolePath::Reviewer, RoleContext::Journal(journal.id))
        .await
        .unwrap_or_else(|error| panic!("grant failed: {error}"));
    let submission = services
        .submissions
        .create_submission(
            &author.identity(),
            journal.id,
            CreateSubmissionInput {
                title: "On footnotes".to_owned(),
                abstract_text: None,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("submission failed: {error}"));
    services
        .reviews
        .assign_reviewer(&admin, submission.id, reviewer.id, None)
        .await
        .unwrap_or_else(|error| panic!("assignment failed: {error}"));

    services
        .users
        .delete_user(&admin, reviewer.id)
        .await
        .unwrap_or_else(|error| panic!("delete failed: {error}"));

    let reviews = services
        .reviews
        .list_reviews_for_submission(&admin, submission.id)
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert!(reviews.is_empty());
    let summary = services
        .resolver
        .list_user_roles(reviewer.id)
        .await
        .unwrap_or_else(|error| panic!("roles failed: {error}"));
    assert!(summary.grants.is_empty() && summary.memberships.is_empty());
}
