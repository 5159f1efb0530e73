use folio_application::{
    CreatePublicationInput, CreateSubmissionInput, Publication, ReviewAssignment, Submission,
    SubmissionChanges, SubmissionWithPublications,
};
use folio_core::AppResult;
use folio_domain::{PublicationStatus, SubmissionStatus, WorkflowStage};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for submitting a manuscript.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-submission-request.ts"
)]
pub struct CreateSubmissionRequest {
    pub title: String,
    pub abstract_text: Option<String>,
}

impl From<CreateSubmissionRequest> for CreateSubmissionInput {
    fn from(value: CreateSubmissionRequest) -> Self {
        Self {
            title: value.title,
            abstract_text: value.abstract_text,
        }
    }
}

/// Incoming payload for moving a submission through the workflow.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-submission-request.ts"
)]
pub struct UpdateSubmissionRequest {
    pub status: Option<String>,
    pub stage: Option<String>,
}

impl UpdateSubmissionRequest {
    pub fn into_changes(self) -> AppResult<SubmissionChanges> {
        Ok(SubmissionChanges {
            status: self
                .status
                .as_deref()
                .map(str::parse::<SubmissionStatus>)
                .transpose()?,
            stage: self
                .stage
                .as_deref()
                .map(str::parse::<WorkflowStage>)
                .transpose()?,
        })
    }
}

/// API representation of a submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-response.ts"
)]
pub struct SubmissionResponse {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub journal_id: i64,
    pub submitter_id: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub status: String,
    pub stage: String,
    pub date_submitted: String,
    #[ts(type = "number | null")]
    pub current_publication_id: Option<i64>,
}

impl From<Submission> for SubmissionResponse {
    fn from(value: Submission) -> Self {
        Self {
            id: value.id,
            journal_id: value.journal_id.as_i64(),
            submitter_id: value.submitter_id.to_string(),
            title: value.title,
            abstract_text: value.abstract_text,
            status: value.status.as_str().to_owned(),
            stage: value.stage.as_str().to_owned(),
            date_submitted: value.date_submitted.to_rfc3339(),
            current_publication_id: value.current_publication_id,
        }
    }
}

/// Submission joined with its publication versions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-detail-response.ts"
)]
pub struct SubmissionDetailResponse {
    pub submission: SubmissionResponse,
    pub has_publications: bool,
    pub publications: Vec<PublicationResponse>,
}

impl From<SubmissionWithPublications> for SubmissionDetailResponse {
    fn from(value: SubmissionWithPublications) -> Self {
        Self {
            has_publications: value.has_publications(),
            submission: SubmissionResponse::from(value.submission),
            publications: value
                .publications
                .into_iter()
                .map(PublicationResponse::from)
                .collect(),
        }
    }
}

/// Incoming payload for a new publication version.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-publication-request.ts"
)]
pub struct CreatePublicationRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    #[ts(type = "number | null")]
    pub issue_id: Option<i64>,
}

impl CreatePublicationRequest {
    pub fn into_input(self) -> AppResult<CreatePublicationInput> {
        Ok(CreatePublicationInput {
            title: self.title,
            status: self
                .status
                .as_deref()
                .map(str::parse::<PublicationStatus>)
                .transpose()?
                .unwrap_or(PublicationStatus::Draft),
            issue_id: self.issue_id,
        })
    }
}

/// API representation of a publication version.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/publication-response.ts"
)]
pub struct PublicationResponse {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub submission_id: i64,
    pub version: i32,
    pub title: String,
    pub status: String,
    #[ts(type = "number | null")]
    pub issue_id: Option<i64>,
    pub date_published: Option<String>,
}

impl From<Publication> for PublicationResponse {
    fn from(value: Publication) -> Self {
        Self {
            id: value.id,
            submission_id: value.submission_id,
            version: value.version,
            title: value.title,
            status: value.status.as_str().to_owned(),
            issue_id: value.issue_id,
            date_published: value.date_published.map(|date| date.to_rfc3339()),
        }
    }
}

/// Incoming payload for assigning a reviewer.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-reviewer-request.ts"
)]
pub struct AssignReviewerRequest {
    pub reviewer_id: String,
    pub date_due: Option<String>,
}

/// Reviewer answer to an invitation: `accept` or `decline`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/respond-to-review-request.ts"
)]
pub struct RespondToReviewRequest {
    pub response: String,
}

/// Incoming payload for completing a review.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/complete-review-request.ts"
)]
pub struct CompleteReviewRequest {
    pub recommendation: String,
}

/// API representation of a review assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/review-assignment-response.ts"
)]
pub struct ReviewAssignmentResponse {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub submission_id: i64,
    pub reviewer_id: String,
    pub status: String,
    pub recommendation: Option<String>,
    pub date_assigned: String,
    pub date_due: Option<String>,
    pub date_completed: Option<String>,
}

impl From<ReviewAssignment> for ReviewAssignmentResponse {
    fn from(value: ReviewAssignment) -> Self {
        Self {
            id: value.id,
            submission_id: value.submission_id,
            reviewer_id: value.reviewer_id.to_string(),
            status: value.status.as_str().to_owned(),
            recommendation: value
                .recommendation
                .map(|recommendation| recommendation.as_str().to_owned()),
            date_assigned: value.date_assigned.to_rfc3339(),
            date_due: value.date_due.map(|date| date.to_rfc3339()),
            date_completed: value.date_completed.map(|date| date.to_rfc3339()),
        }
    }
}
