use std::sync::Arc;

use folio_core::{AppError, UserId, UserIdentity};
use folio_domain::{LegacyRoleId, RoleContext};

use crate::RoleResolver;
use crate::test_support::{FakeDirectory, FakeRoleStore, FakeWorkflowStore, identity, journal_id};

use super::{IssueChanges, IssueFields, IssueService};

struct Fixture {
    workflow: Arc<FakeWorkflowStore>,
    service: IssueService,
    editor: UserIdentity,
    reader: UserIdentity,
}

async fn fixture() -> Fixture {
    let roles = Arc::new(FakeRoleStore::default());
    let directory = Arc::new(FakeDirectory::default());
    let workflow = Arc::new(FakeWorkflowStore::default());
    let resolver = RoleResolver::new(roles.clone(), roles.clone());
    let service = IssueService::new(workflow.clone(), directory.clone(), resolver);

    directory.add_journal(journal_id(5)).await;
    let editor_id = UserId::new();
    roles
        .seed_membership(
            editor_id,
            LegacyRoleId::MANAGER,
            RoleContext::Journal(journal_id(5)),
        )
        .await;

    Fixture {
        workflow,
        service,
        editor: identity(editor_id),
        reader: identity(UserId::new()),
    }
}

fn fields(volume: Option<i32>, year: Option<i32>) -> IssueFields {
    IssueFields {
        volume,
        number: Some(" 2 ".to_owned()),
        year,
        title: Some("  Marginalia  ".to_owned()),
    }
}

fn publish(published: bool) -> IssueChanges {
    IssueChanges {
        fields: IssueFields::default(),
        published: Some(published),
    }
}

#[tokio::test]
async fn publishing_stamps_and_unpublishing_clears_the_date() {
    let fixture = fixture().await;
    let created = fixture
        .service
        .create_issue(&fixture.editor, journal_id(5), fields(Some(4), Some(2025)))
        .await
        .unwrap_or_else(|error| panic!("issue creation failed: {error}"));
    assert!(!created.published);
    assert_eq!(created.number.as_deref(), Some("2"));
    assert_eq!(created.title.as_deref(), Some("Marginalia"));

    let published = fixture
        .service
        .update_issue(&fixture.editor, created.id, publish(true))
        .await
        .unwrap_or_else(|error| panic!("publishing failed: {error}"));
    assert!(published.published);
    let stamped = published.date_published;
    assert!(stamped.is_some());

    let republished = fixture
        .service
        .update_issue(&fixture.editor, created.id, publish(true))
        .await
        .unwrap_or_else(|error| panic!("republishing failed: {error}"));
    assert_eq!(republished.date_published, stamped);

    let unpublished = fixture
        .service
        .update_issue(&fixture.editor, created.id, publish(false))
        .await
        .unwrap_or_else(|error| panic!("unpublishing failed: {error}"));
    assert!(!unpublished.published);
    assert!(unpublished.date_published.is_none());
}

#[tokio::test]
async fn readers_only_see_published_issues() {
    let fixture = fixture().await;
    let hidden = fixture.workflow.add_issue(journal_id(5)).await;
    let visible = fixture.workflow.add_issue(journal_id(5)).await;
    fixture
        .service
        .update_issue(&fixture.editor, visible, publish(true))
        .await
        .unwrap_or_else(|error| panic!("publishing failed: {error}"));

    let listed = fixture
        .service
        .list_issues(&fixture.reader, journal_id(5))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert_eq!(
        listed.iter().map(|issue| issue.id).collect::<Vec<_>>(),
        vec![visible]
    );

    let lookup = fixture.service.get_issue(&fixture.reader, hidden).await;
    assert!(matches!(lookup, Err(AppError::NotFound(_))));

    let as_editor = fixture
        .service
        .list_issues(&fixture.editor, journal_id(5))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert_eq!(as_editor.len(), 2);
    assert!(fixture.service.get_issue(&fixture.editor, hidden).await.is_ok());
}

#[tokio::test]
async fn volume_and_year_are_validated() {
    let fixture = fixture().await;

    let zero_volume = fixture
        .service
        .create_issue(&fixture.editor, journal_id(5), fields(Some(0), Some(2025)))
        .await;
    assert!(matches!(zero_volume, Err(AppError::Validation(_))));

    let short_year = fixture
        .service
        .create_issue(&fixture.editor, journal_id(5), fields(Some(1), Some(99)))
        .await;
    assert!(matches!(short_year, Err(AppError::Validation(_))));

    let issue_id = fixture.workflow.add_issue(journal_id(5)).await;
    let bad_update = fixture
        .service
        .update_issue(
            &fixture.editor,
            issue_id,
            IssueChanges {
                fields: fields(None, Some(10_000)),
                published: None,
            },
        )
        .await;
    assert!(matches!(bad_update, Err(AppError::Validation(_))));
    assert_eq!(fixture.workflow.issues.lock().await.len(), 1);
}

#[tokio::test]
async fn only_journal_editors_manage_issues() {
    let fixture = fixture().await;
    let issue_id = fixture.workflow.add_issue(journal_id(5)).await;

    let created = fixture
        .service
        .create_issue(&fixture.reader, journal_id(5), IssueFields::default())
        .await;
    assert!(matches!(created, Err(AppError::Forbidden(_))));

    let deleted = fixture.service.delete_issue(&fixture.reader, issue_id).await;
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));

    fixture
        .service
        .delete_issue(&fixture.editor, issue_id)
        .await
        .unwrap_or_else(|error| panic!("delete failed: {error}"));
    let missing = fixture.service.get_issue(&fixture.editor, issue_id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
