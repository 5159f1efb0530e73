use async_trait::async_trait;
use chrono::Utc;

use folio_application::{
    NewPublication, NewReviewAssignment, NewSubmission, Publication, ReviewAssignment,
    ReviewRepository, ReviewTransition, Submission, SubmissionChanges, SubmissionRepository,
    SubmissionWithPublications,
};
use folio_core::{AppError, AppResult, JournalId, UserId};
use folio_domain::{ReviewStatus, SubmissionStatus, WorkflowStage};

use super::InMemoryStore;

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission> {
        let mut state = self.state.write().await;
        let created = Submission {
            id: state.next_id(),
            journal_id: submission.journal_id,
            submitter_id: submission.submitter_id,
            title: submission.title.into(),
            abstract_text: submission.abstract_text,
            status: SubmissionStatus::Queued,
            stage: WorkflowStage::Submission,
            date_submitted: Utc::now(),
            current_publication_id: None,
        };
        state.submissions.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> AppResult<Option<SubmissionWithPublications>> {
        let state = self.state.read().await;
        let Some(submission) = state.submissions.get(&submission_id).cloned() else {
            return Ok(None);
        };

        let mut publications: Vec<Publication> = state
            .publications
            .values()
            .filter(|publication| publication.submission_id == submission_id)
            .cloned()
            .collect();
        publications.sort_by_key(|publication| publication.version);

        Ok(Some(SubmissionWithPublications {
            submission,
            publications,
        }))
    }

    async fn list_journal_submissions(&self, journal_id: JournalId) -> AppResult<Vec<Submission>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .submissions
                .values()
                .filter(|submission| submission.journal_id == journal_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_submitter_submissions(&self, submitter_id: UserId) -> AppResult<Vec<Submission>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .submissions
                .values()
                .filter(|submission| submission.submitter_id == submitter_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update_submission(
        &self,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> AppResult<Option<Submission>> {
        let mut state = self.state.write().await;
        Ok(state.submissions.get_mut(&submission_id).map(|submission| {
            if let Some(status) = changes.status {
                submission.status = status;
            }
            if let Some(stage) = changes.stage {
                submission.stage = stage;
            }
            submission.clone()
        }))
    }

    async fn create_publication(&self, publication: NewPublication) -> AppResult<Publication> {
        let mut state = self.state.write().await;
        if !state.submissions.contains_key(&publication.submission_id) {
            return Err(AppError::NotFound(format!(
                "submission {} was not found",
                publication.submission_id
            )));
        }

        let version = state
            .publications
            .values()
            .filter(|existing| existing.submission_id == publication.submission_id)
            .map(|existing| existing.version)
            .max()
            .unwrap_or(0)
            + 1;
        let created = Publication {
            id: state.next_id(),
            submission_id: publication.submission_id,
            version,
            title: publication.title.into(),
            status: publication.status,
            issue_id: publication.issue_id,
            date_published: publication.date_published,
        };
        state.publications.insert(created.id, created.clone());
        if let Some(submission) = state.submissions.get_mut(&publication.submission_id) {
            submission.current_publication_id = Some(created.id);
        }

        Ok(created)
    }

    async fn delete_submission(&self, submission_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.submissions.contains_key(&submission_id) {
            return Ok(false);
        }

        state.remove_submission_rows(submission_id);
        Ok(true)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn create_assignment(&self, assignment: NewReviewAssignment) -> AppResult<ReviewAssignment> {
        let mut state = self.state.write().await;
        if state.assignments.values().any(|existing| {
            existing.submission_id == assignment.submission_id
                && existing.reviewer_id == assignment.reviewer_id
        }) {
            return Err(AppError::Conflict(format!(
                "reviewer '{}' is already assigned to submission {}",
                assignment.reviewer_id, assignment.submission_id
            )));
        }

        let created = ReviewAssignment {
            id: state.next_id(),
            submission_id: assignment.submission_id,
            reviewer_id: assignment.reviewer_id,
            status: ReviewStatus::Pending,
            recommendation: None,
            date_assigned: Utc::now(),
            date_due: assignment.date_due,
            date_completed: None,
        };
        state.assignments.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_assignment(&self, assignment_id: i64) -> AppResult<Option<ReviewAssignment>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .get(&assignment_id)
            .cloned())
    }

    async fn find_assignment_for_reviewer(
        &self,
        submission_id: i64,
        reviewer_id: UserId,
    ) -> AppResult<Option<ReviewAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .values()
            .find(|assignment| {
                assignment.submission_id == submission_id && assignment.reviewer_id == reviewer_id
            })
            .cloned())
    }

    async fn list_submission_assignments(&self, submission_id: i64) -> AppResult<Vec<ReviewAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .values()
            .filter(|assignment| assignment.submission_id == submission_id)
            .cloned()
            .collect())
    }

    async fn list_reviewer_assignments(&self, reviewer_id: UserId) -> AppResult<Vec<ReviewAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .values()
            .rev()
            .filter(|assignment| assignment.reviewer_id == reviewer_id)
            .cloned()
            .collect())
    }

    async fn transition_assignment(
        &self,
        assignment_id: i64,
        transition: ReviewTransition,
    ) -> AppResult<Option<ReviewAssignment>> {
        let mut state = self.state.write().await;
        Ok(state
            .assignments
            .get_mut(&assignment_id)
            .filter(|assignment| assignment.status == transition.from)
            .map(|assignment| {
                assignment.status = transition.status;
                if transition.recommendation.is_some() {
                    assignment.recommendation = transition.recommendation;
                }
                if transition.date_completed.is_some() {
                    assignment.date_completed = transition.date_completed;
                }
                assignment.clone()
            }))
    }

    async fn delete_assignment(&self, assignment_id: i64) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .assignments
            .remove(&assignment_id)
            .is_some())
    }
}

fn newest_first(mut submissions: Vec<Submission>) -> Vec<Submission> {
    submissions.sort_by(|left, right| {
        right
            .date_submitted
            .cmp(&left.date_submitted)
            .then(right.id.cmp(&left.id))
    });
    submissions
}
