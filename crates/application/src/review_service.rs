use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, UserId, UserIdentity};
use folio_domain::{ReviewRecommendation, ReviewStatus, RolePath, WorkflowStage};

use crate::{RoleResolver, SubmissionService};


/// Reviewer assigned to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAssignment {
    /// Assignment primary key.
    pub id: i64,
    /// Reviewed submission.
    pub submission_id: i64,
    /// Assigned reviewer.
    pub reviewer_id: UserId,
    /// Lifecycle status.
    pub status: ReviewStatus,
    /// Recommendation recorded on completion.
    pub recommendation: Option<ReviewRecommendation>,
    /// Assignment timestamp.
    pub date_assigned: DateTime<Utc>,
    /// Optional due date.
    pub date_due: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub date_completed: Option<DateTime<Utc>>,
}

/// Validated row for a new assignment.
#[derive(Debug, Clone, Copy)]
pub struct NewReviewAssignment {
    /// Reviewed submission.
    pub submission_id: i64,
    /// Assigned reviewer.
    pub reviewer_id: UserId,
    /// Optional due date.
    pub date_due: Option<DateTime<Utc>>,
}

/// State change of an assignment.
#[derive(Debug, Clone, Copy)]
pub struct ReviewTransition {
    /// Status the assignment must still hold for the change to apply.
    pub from: ReviewStatus,
    /// New status.
    pub status: ReviewStatus,
    /// Recommendation to record.
    pub recommendation: Option<ReviewRecommendation>,
    /// Completion timestamp to record.
    pub date_completed: Option<DateTime<Utc>>,
}

/// Reviewer answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewResponse {
    /// The reviewer takes the review.
    Accept,
    /// The reviewer declines the review.
    Decline,
}

/// Repository port for review assignments.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Inserts a pending assignment. A reviewer is assigned at most once per submission.
    async fn create_assignment(&self, assignment: NewReviewAssignment) -> AppResult<ReviewAssignment>;

    /// Finds an assignment by id.
    async fn find_assignment(&self, assignment_id: i64) -> AppResult<Option<ReviewAssignment>>;

    /// Finds the assignment of one reviewer on one submission.
    async fn find_assignment_for_reviewer(
        &self,
        submission_id: i64,
        reviewer_id: UserId,
    ) -> AppResult<Option<ReviewAssignment>>;

    /// Lists the assignments of a submission, oldest first.
    async fn list_submission_assignments(&self, submission_id: i64) -> AppResult<Vec<ReviewAssignment>>;

    /// Lists the assignments of a reviewer, newest first.
    async fn list_reviewer_assignments(&self, reviewer_id: UserId) -> AppResult<Vec<ReviewAssignment>>;

    /// Records a status change when the assignment still holds `transition.from`.
    ///
    /// Returns `None` when no assignment matches the id and expected status.
    async fn transition_assignment(
        &self,
        assignment_id: i64,
        transition: ReviewTransition,
    ) -> AppResult<Option<ReviewAssignment>>;

    /// Deletes an assignment. Returns whether a row was removed.
    async fn delete_assignment(&self, assignment_id: i64) -> AppResult<bool>;
}

/// Application service for peer review.
#[derive(Clone)]
pub struct ReviewService {
    repository: Arc<dyn ReviewRepository>,
    submission_service: SubmissionService,
    resolver: RoleResolver,
}

impl ReviewService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ReviewRepository>,
        submission_service: SubmissionService,
        resolver: RoleResolver,
    ) -> Self {
        Self {
            repository,
            submission_service,
            resolver,
        }
    }

    /// Assigns a reviewer and moves the submission into the review stage.
    ///
    /// The reviewer must hold the `reviewer` role in the submission's journal.
    pub async fn assign_reviewer(
        &self,
        actor: &UserIdentity,
        submission_id: i64,
        reviewer_id: UserId,
        date_due: Option<DateTime<Utc>>,
    ) -> AppResult<ReviewAssignment> {
        let submission = self
            .submission_service
            .find_submission(submission_id)
            .await?
            .submission;
        self.submission_service
            .require_editor(actor, submission.journal_id)
            .await?;

        if submission.submitter_id == reviewer_id {
            return Err(AppError::Validation(
                "the submitter cannot review their own submission".to_owned(),
            ));
        }

        if !self
            .resolver
            .has_user_journal_role(
                reviewer_id,
                submission.journal_id,
                &[RolePath::Reviewer.as_str()],
            )
            .await
        {
            return Err(AppError::Validation(format!(
                "user '{reviewer_id}' is not a reviewer in journal {}",
                submission.journal_id
            )));
        }

        let assignment = self
            .repository
            .create_assignment(NewReviewAssignment {
                submission_id,
                reviewer_id,
                date_due,
            })
            .await?;
        self.submission_service
            .move_to_stage(&submission, WorkflowStage::Review)
            .await?;

        info!(
            actor = %actor.user_id(),
            submission_id,
            %reviewer_id,
            assignment_id = assignment.id,
            "reviewer assigned"
        );
        Ok(assignment)
    }

    /// Accepts or declines a pending assignment. Assigned reviewer only.
    pub async fn respond_to_review(
        &self,
        actor: &UserIdentity,
        assignment_id: i64,
        response: ReviewResponse,
    ) -> AppResult<ReviewAssignment> {
        let assignment = self.find_own_assignment(actor, assignment_id).await?;
        if assignment.status != ReviewStatus::Pending {
            return Err(AppError::Conflict(format!(
                "review assignment {assignment_id} is already {}",
                assignment.status.as_str()
            )));
        }

        let status = match response {
            ReviewResponse::Accept => ReviewStatus::Accepted,
            ReviewResponse::Decline => ReviewStatus::Declined,
        };
        let updated = self
            .transition(
                assignment_id,
                ReviewTransition {
                    from: ReviewStatus::Pending,
                    status,
                    recommendation: None,
                    date_completed: None,
                },
            )
            .await?;

        info!(actor = %actor.user_id(), assignment_id, status = status.as_str(), "review invitation answered");
        Ok(updated)
    }

    /// Completes an accepted assignment with a recommendation. Assigned reviewer only.
    pub async fn complete_review(
        &self,
        actor: &UserIdentity,
        assignment_id: i64,
        recommendation: ReviewRecommendation,
    ) -> AppResult<ReviewAssignment> {
        let assignment = self.find_own_assignment(actor, assignment_id).await?;
        if assignment.status != ReviewStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "review assignment {assignment_id} must be accepted before completion, it is {}",
                assignment.status.as_str()
            )));
        }

        let updated = self
            .transition(
                assignment_id,
                ReviewTransition {
                    from: ReviewStatus::Accepted,
                    status: ReviewStatus::Completed,
                    recommendation: Some(recommendation),
                    date_completed: Some(Utc::now()),
                },
            )
            .await?;

        info!(
            actor = %actor.user_id(),
            assignment_id,
            recommendation = recommendation.as_str(),
            "review completed"
        );
        Ok(updated)
    }

    /// Lists the assignments of a submission. Editorial roles only.
    pub async fn list_reviews_for_submission(
        &self,
        actor: &UserIdentity,
        submission_id: i64,
    ) -> AppResult<Vec<ReviewAssignment>> {
        let submission = self
            .submission_service
            .find_submission(submission_id)
            .await?
            .submission;
        self.submission_service
            .require_editor(actor, submission.journal_id)
            .await?;

        self.repository
            .list_submission_assignments(submission_id)
            .await
    }

    /// Lists the actor's own assignments.
    pub async fn list_my_reviews(&self, actor: &UserIdentity) -> AppResult<Vec<ReviewAssignment>> {
        self.repository
            .list_reviewer_assignments(actor.user_id())
            .await
    }

    /// Deletes an assignment. Editorial roles only.
    pub async fn delete_review_assignment(
        &self,
        actor: &UserIdentity,
        assignment_id: i64,
    ) -> AppResult<()> {
        let assignment = self.find_assignment(assignment_id).await?;
        let submission = self
            .submission_service
            .find_submission(assignment.submission_id)
            .await?
            .submission;
        self.submission_service
            .require_editor(actor, submission.journal_id)
            .await?;

        if !self.repository.delete_assignment(assignment_id).await? {
            return Err(assignment_not_found(assignment_id));
        }

        info!(actor = %actor.user_id(), assignment_id, "review assignment deleted");
        Ok(())
    }

    async fn find_assignment(&self, assignment_id: i64) -> AppResult<ReviewAssignment> {
        self.repository
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| assignment_not_found(assignment_id))
    }

    async fn find_own_assignment(
        &self,
        actor: &UserIdentity,
        assignment_id: i64,
    ) -> AppResult<ReviewAssignment> {
        let assignment = self.find_assignment(assignment_id).await?;
        if assignment.reviewer_id != actor.user_id() {
            return Err(AppError::Forbidden(format!(
                "review assignment {assignment_id} belongs to another reviewer"
            )));
        }

        Ok(assignment)
    }

    async fn transition(
        &self,
        assignment_id: i64,
        transition: ReviewTransition,
    ) -> AppResult<ReviewAssignment> {
        if let Some(updated) = self
            .repository
            .transition_assignment(assignment_id, transition)
            .await?
        {
            return Ok(updated);
        }

        let current = self.find_assignment(assignment_id).await?;
        Err(AppError::Conflict(format!(
            "review assignment {assignment_id} changed to {} concurrently",
            current.status.as_str()
        )))
    }
}

fn assignment_not_found(assignment_id: i64) -> AppError {
    AppError::NotFound(format!("review assignment {assignment_id} was not found"))
}
