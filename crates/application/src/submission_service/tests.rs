use std::sync::Arc;

use folio_core::{AppError, UserId, UserIdentity};
use folio_domain::{LegacyRoleId, PublicationStatus, RoleContext, SubmissionStatus, WorkflowStage};

use crate::RoleResolver;
use crate::test_support::{FakeDirectory, FakeRoleStore, FakeWorkflowStore, identity, journal_id};

use super::{CreatePublicationInput, CreateSubmissionInput, SubmissionChanges, SubmissionService};

struct Fixture {
    roles: Arc<FakeRoleStore>,
    directory: Arc<FakeDirectory>,
    workflow: Arc<FakeWorkflowStore>,
    service: SubmissionService,
    author: UserIdentity,
    editor: UserIdentity,
}

async fn fixture() -> Fixture {
    let roles = Arc::new(FakeRoleStore::default());
    let directory = Arc::new(FakeDirectory::default());
    let workflow = Arc::new(FakeWorkflowStore::default());
    let resolver = RoleResolver::new(roles.clone(), roles.clone());
    let service = SubmissionService::new(
        workflow.clone(),
        directory.clone(),
        workflow.clone(),
        workflow.clone(),
        resolver,
    );

    directory.add_journal(journal_id(1)).await;
    let editor_id = UserId::new();
    roles
        .seed_membership(editor_id, LegacyRoleId::MANAGER, RoleContext::Journal(journal_id(1)))
        .await;

    Fixture {
        roles,
        directory,
        workflow,
        service,
        author: identity(UserId::new()),
        editor: identity(editor_id),
    }
}

fn manuscript() -> CreateSubmissionInput {
    CreateSubmissionInput {
        title: "  On Role Stores  ".to_owned(),
        abstract_text: Some("   ".to_owned()),
    }
}

#[tokio::test]
async fn new_submission_starts_queued_without_publications() {
    let fixture = fixture().await;

    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    assert_eq!(created.title, "On Role Stores");
    assert_eq!(created.abstract_text, None);
    assert_eq!(created.status, SubmissionStatus::Queued);
    assert_eq!(created.stage, WorkflowStage::Submission);

    let loaded = fixture
        .service
        .get_submission(&fixture.author, created.id)
        .await
        .unwrap_or_else(|error| panic!("get failed: {error}"));
    assert!(!loaded.has_publications());
    assert!(loaded.current_publication().is_none());
}

#[tokio::test]
async fn submissions_into_missing_or_disabled_journals_are_rejected() {
    let fixture = fixture().await;
    fixture
        .directory
        .add_journal_with_state(journal_id(2), false)
        .await;

    let missing = fixture
        .service
        .create_submission(&fixture.author, journal_id(9), manuscript())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let disabled = fixture
        .service
        .create_submission(&fixture.author, journal_id(2), manuscript())
        .await;
    assert!(matches!(disabled, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn hidden_submissions_look_missing_to_strangers() {
    let fixture = fixture().await;
    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    let stranger = identity(UserId::new());
    let denied = fixture.service.get_submission(&stranger, created.id).await;
    let absent = fixture.service.get_submission(&stranger, created.id + 1000).await;
    match (denied, absent) {
        (Err(AppError::NotFound(hidden)), Err(AppError::NotFound(missing))) => {
            let hidden = hidden.replace(&created.id.to_string(), "#");
            let missing = missing.replace(&(created.id + 1000).to_string(), "#");
            assert_eq!(hidden, missing);
        }
        other => panic!("expected two NotFound errors, got {other:?}"),
    }

    let allowed = fixture.service.get_submission(&fixture.editor, created.id).await;
    assert!(allowed.is_ok());
}

#[tokio::test]
async fn only_editorial_roles_move_submissions() {
    let fixture = fixture().await;
    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let changes = SubmissionChanges {
        status: Some(SubmissionStatus::Scheduled),
        stage: Some(WorkflowStage::Production),
    };

    let by_author = fixture
        .service
        .update_submission(&fixture.author, created.id, changes)
        .await;
    assert!(matches!(by_author, Err(AppError::Forbidden(_))));

    let by_editor = fixture
        .service
        .update_submission(&fixture.editor, created.id, changes)
        .await
        .unwrap_or_else(|error| panic!("update failed: {error}"));
    assert_eq!(by_editor.status, SubmissionStatus::Scheduled);
    assert_eq!(by_editor.stage, WorkflowStage::Production);
}

#[tokio::test]
async fn publications_become_current_and_version_up() {
    let fixture = fixture().await;
    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let issue_id = fixture.workflow.add_issue(journal_id(1)).await;

    let first = fixture
        .service
        .create_publication(
            &fixture.editor,
            created.id,
            CreatePublicationInput {
                title: None,
                status: PublicationStatus::Draft,
                issue_id: None,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("first publication failed: {error}"));
    let second = fixture
        .service
        .create_publication(
            &fixture.editor,
            created.id,
            CreatePublicationInput {
                title: Some("On Role Stores, Revised".to_owned()),
                status: PublicationStatus::Published,
                issue_id: Some(issue_id),
            },
        )
        .await
        .unwrap_or_else(|error| panic!("second publication failed: {error}"));

    assert_eq!(first.title, "On Role Stores");
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert!(second.date_published.is_some());

    let loaded = fixture
        .service
        .get_submission(&fixture.author, created.id)
        .await
        .unwrap_or_else(|error| panic!("get failed: {error}"));
    assert!(loaded.has_publications());
    assert_eq!(
        loaded.current_publication().map(|publication| publication.id),
        Some(second.id)
    );
}

#[tokio::test]
async fn publications_reject_issues_from_other_journals() {
    let fixture = fixture().await;
    fixture.directory.add_journal(journal_id(2)).await;
    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));
    let foreign_issue = fixture.workflow.add_issue(journal_id(2)).await;

    let result = fixture
        .service
        .create_publication(
            &fixture.editor,
            created.id,
            CreatePublicationInput {
                title: None,
                status: PublicationStatus::Scheduled,
                issue_id: Some(foreign_issue),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn deleting_requires_manager_or_admin() {
    let fixture = fixture().await;
    let created = fixture
        .service
        .create_submission(&fixture.author, journal_id(1), manuscript())
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    let section_editor = UserId::new();
    fixture
        .roles
        .seed_membership(
            section_editor,
            LegacyRoleId::SUB_EDITOR,
            RoleContext::Journal(journal_id(1)),
        )
        .await;
    let denied = fixture
        .service
        .delete_submission(&identity(section_editor), created.id)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    assert!(
        fixture
            .service
            .delete_submission(&fixture.editor, created.id)
            .await
            .is_ok()
    );
    let gone = fixture.service.get_submission(&fixture.author, created.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}
