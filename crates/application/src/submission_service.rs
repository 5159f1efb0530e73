use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, JournalId, NonEmptyString, UserId, UserIdentity};
use folio_domain::{PublicationStatus, RolePath, SubmissionStatus, WorkflowStage};

use crate::{
    IssueRepository, JournalRepository, ReviewRepository, RoleResolver,
    journal_service::journal_not_found,
};

#[cfg(test)]
mod tests;

/// Manuscript submitted to a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Submission primary key.
    pub id: i64,
    /// Journal the manuscript was submitted to.
    pub journal_id: JournalId,
    /// Submitting author.
    pub submitter_id: UserId,
    /// Working title.
    pub title: String,
    /// Abstract.
    pub abstract_text: Option<String>,
    /// Editorial decision status.
    pub status: SubmissionStatus,
    /// Current workflow stage.
    pub stage: WorkflowStage,
    /// Submission timestamp.
    pub date_submitted: DateTime<Utc>,
    /// Latest publication version, if any.
    pub current_publication_id: Option<i64>,
}

/// Versioned publication of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Publication primary key.
    pub id: i64,
    /// Owning submission.
    pub submission_id: i64,
    /// Version number starting at 1.
    pub version: i32,
    /// Title of this version.
    pub title: String,
    /// Publication status.
    pub status: PublicationStatus,
    /// Issue the version is assigned to.
    pub issue_id: Option<i64>,
    /// Set once the version is published.
    pub date_published: Option<DateTime<Utc>>,
}

/// Submission joined with its publications.
///
/// A submission without publication rows keeps an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionWithPublications {
    /// Submission row.
    pub submission: Submission,
    /// Publications ordered by version.
    pub publications: Vec<Publication>,
}

impl SubmissionWithPublications {
    /// Returns whether at least one publication exists.
    #[must_use]
    pub fn has_publications(&self) -> bool {
        !self.publications.is_empty()
    }

    /// Returns the publication referenced by `current_publication_id`.
    #[must_use]
    pub fn current_publication(&self) -> Option<&Publication> {
        let current = self.submission.current_publication_id?;
        self.publications
            .iter()
            .find(|publication| publication.id == current)
    }
}

/// Validated row for a new submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    /// Target journal.
    pub journal_id: JournalId,
    /// Submitting author.
    pub submitter_id: UserId,
    /// Working title.
    pub title: NonEmptyString,
    /// Abstract.
    pub abstract_text: Option<String>,
}

/// Partial update of a submission's workflow state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionChanges {
    /// New decision status.
    pub status: Option<SubmissionStatus>,
    /// New workflow stage.
    pub stage: Option<WorkflowStage>,
}

/// Validated row for a new publication version.
#[derive(Debug, Clone)]
pub struct NewPublication {
    /// Owning submission.
    pub submission_id: i64,
    /// Title of the version.
    pub title: NonEmptyString,
    /// Initial status.
    pub status: PublicationStatus,
    /// Assigned issue.
    pub issue_id: Option<i64>,
    /// Publication timestamp for published versions.
    pub date_published: Option<DateTime<Utc>>,
}

/// Input for submitting a manuscript.
#[derive(Debug, Clone)]
pub struct CreateSubmissionInput {
    /// Working title.
    pub title: String,
    /// Abstract.
    pub abstract_text: Option<String>,
}

/// Input for a new publication version.
#[derive(Debug, Clone)]
pub struct CreatePublicationInput {
    /// Title; defaults to the submission title.
    pub title: Option<String>,
    /// Initial status.
    pub status: PublicationStatus,
    /// Issue of the same journal.
    pub issue_id: Option<i64>,
}

/// Repository port for submissions and their publications.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Inserts a queued submission in the `submission` stage.
    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission>;

    /// Finds a submission with its publications.
    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> AppResult<Option<SubmissionWithPublications>>;

    /// Lists the submissions of a journal, newest first.
    async fn list_journal_submissions(&self, journal_id: JournalId) -> AppResult<Vec<Submission>>;

    /// Lists the submissions of one author, newest first.
    async fn list_submitter_submissions(&self, submitter_id: UserId) -> AppResult<Vec<Submission>>;

    /// Applies a partial workflow update.
    async fn update_submission(
        &self,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> AppResult<Option<Submission>>;

    /// Inserts the next publication version and points `current_publication_id` at it.
    async fn create_publication(&self, publication: NewPublication) -> AppResult<Publication>;

    /// Deletes a submission with its publications and review assignments.
    async fn delete_submission(&self, submission_id: i64) -> AppResult<bool>;
}

/// Application service for the submission workflow.
#[derive(Clone)]
pub struct SubmissionService {
    repository: Arc<dyn SubmissionRepository>,
    journal_repository: Arc<dyn JournalRepository>,
    issue_repository: Arc<dyn IssueRepository>,
    review_repository: Arc<dyn ReviewRepository>,
    resolver: RoleResolver,
}

impl SubmissionService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SubmissionRepository>,
        journal_repository: Arc<dyn JournalRepository>,
        issue_repository: Arc<dyn IssueRepository>,
        review_repository: Arc<dyn ReviewRepository>,
        resolver: RoleResolver,
    ) -> Self {
        Self {
            repository,
            journal_repository,
            issue_repository,
            review_repository,
            resolver,
        }
    }

    /// Submits a manuscript to an enabled journal.
    pub async fn create_submission(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
        input: CreateSubmissionInput,
    ) -> AppResult<Submission> {
        match self.journal_repository.find_journal(journal_id).await? {
            Some(journal) if journal.enabled => {}
            _ => return Err(journal_not_found(journal_id)),
        }

        let submission = self
            .repository
            .create_submission(NewSubmission {
                journal_id,
                submitter_id: actor.user_id(),
                title: NonEmptyString::new(input.title.trim())?,
                abstract_text: input
                    .abstract_text
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty()),
            })
            .await?;

        info!(
            actor = %actor.user_id(),
            %journal_id,
            submission_id = submission.id,
            "submission created"
        );
        Ok(submission)
    }

    /// Returns a submission with its publications.
    ///
    /// Visible to the submitter, assigned reviewers, and the journal's editors.
    /// Anyone else gets `NotFound`, as for a missing id.
    pub async fn get_submission(
        &self,
        actor: &UserIdentity,
        submission_id: i64,
    ) -> AppResult<SubmissionWithPublications> {
        let found = self.find_submission(submission_id).await?;
        let submission = &found.submission;

        if submission.submitter_id == actor.user_id()
            || self.is_editor(actor.user_id(), submission.journal_id).await
            || self
                .review_repository
                .find_assignment_for_reviewer(submission_id, actor.user_id())
                .await?
                .is_some()
        {
            return Ok(found);
        }

        Err(submission_not_found(submission_id))
    }

    /// Lists every submission of a journal. Editorial roles only.
    pub async fn list_journal_submissions(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
    ) -> AppResult<Vec<Submission>> {
        self.require_editor(actor, journal_id).await?;
        self.repository.list_journal_submissions(journal_id).await
    }

    /// Lists the actor's own submissions.
    pub async fn list_my_submissions(&self, actor: &UserIdentity) -> AppResult<Vec<Submission>> {
        self.repository
            .list_submitter_submissions(actor.user_id())
            .await
    }

    /// Moves a submission through the workflow. Editorial roles only.
    pub async fn update_submission(
        &self,
        actor: &UserIdentity,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> AppResult<Submission> {
        let existing = self.find_submission(submission_id).await?.submission;
        self.require_editor(actor, existing.journal_id).await?;

        let submission = self
            .repository
            .update_submission(submission_id, changes)
            .await?
            .ok_or_else(|| submission_not_found(submission_id))?;

        info!(
            actor = %actor.user_id(),
            submission_id,
            status = submission.status.as_str(),
            stage = submission.stage.as_str(),
            "submission updated"
        );
        Ok(submission)
    }

    /// Adds a publication version and makes it current. Editorial roles only.
    pub async fn create_publication(
        &self,
        actor: &UserIdentity,
        submission_id: i64,
        input: CreatePublicationInput,
    ) -> AppResult<Publication> {
        let submission = self.find_submission(submission_id).await?.submission;
        self.require_editor(actor, submission.journal_id).await?;

        if let Some(issue_id) = input.issue_id {
            let belongs_to_journal = self
                .issue_repository
                .find_issue(issue_id)
                .await?
                .is_some_and(|issue| issue.journal_id == submission.journal_id);
            if !belongs_to_journal {
                return Err(AppError::Validation(format!(
                    "issue {issue_id} does not belong to journal {}",
                    submission.journal_id
                )));
            }
        }

        let title = match input.title {
            Some(title) => NonEmptyString::new(title.trim())?,
            None => NonEmptyString::new(submission.title)?,
        };
        let date_published = (input.status == PublicationStatus::Published).then(Utc::now);

        let publication = self
            .repository
            .create_publication(NewPublication {
                submission_id,
                title,
                status: input.status,
                issue_id: input.issue_id,
                date_published,
            })
            .await?;

        info!(
            actor = %actor.user_id(),
            submission_id,
            publication_id = publication.id,
            version = publication.version,
            "publication created"
        );
        Ok(publication)
    }

    /// Deletes a submission. Site administrators or journal managers.
    pub async fn delete_submission(&self, actor: &UserIdentity, submission_id: i64) -> AppResult<()> {
        let existing = self.find_submission(submission_id).await?.submission;
        self.resolver
            .require_site_admin_or_journal_role(actor, existing.journal_id, &[RolePath::Manager])
            .await?;

        if !self.repository.delete_submission(submission_id).await? {
            return Err(submission_not_found(submission_id));
        }

        info!(actor = %actor.user_id(), submission_id, "submission deleted");
        Ok(())
    }

    /// Returns a submission without a visibility check.
    pub(crate) async fn find_submission(
        &self,
        submission_id: i64,
    ) -> AppResult<SubmissionWithPublications> {
        self.repository
            .find_submission(submission_id)
            .await?
            .ok_or_else(|| submission_not_found(submission_id))
    }

    pub(crate) async fn is_editor(&self, user_id: UserId, journal_id: JournalId) -> bool {
        self.resolver
            .has_site_admin_or_journal_role(user_id, journal_id, RolePath::editorial())
            .await
    }

    pub(crate) async fn require_editor(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
    ) -> AppResult<()> {
        self.resolver
            .require_site_admin_or_journal_role(actor, journal_id, RolePath::editorial())
            .await
    }

    pub(crate) async fn move_to_stage(
        &self,
        submission: &Submission,
        stage: WorkflowStage,
    ) -> AppResult<()> {
        if submission.stage >= stage {
            return Ok(());
        }

        self.repository
            .update_submission(
                submission.id,
                SubmissionChanges {
                    status: None,
                    stage: Some(stage),
                },
            )
            .await?;
        Ok(())
    }
}

fn submission_not_found(submission_id: i64) -> AppError {
    AppError::NotFound(format!("submission {submission_id} was not found"))
}
