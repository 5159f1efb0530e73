use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_application::ReviewResponse;
use folio_core::{AppError, AppResult, UserIdentity};
use folio_domain::ReviewRecommendation;

use crate::dto::{
    ApiEnvelope, ApiJson, AssignReviewerRequest, CompleteReviewRequest, RespondToReviewRequest,
    ReviewAssignmentResponse, parse_timestamp,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_user_id;

fn parse_review_response(value: &str) -> AppResult<ReviewResponse> {
    match value.trim() {
        "accept" => Ok(ReviewResponse::Accept),
        "decline" => Ok(ReviewResponse::Decline),
        other => Err(AppError::Validation(format!(
            "review response must be 'accept' or 'decline', got '{other}'"
        ))),
    }
}

pub async fn list_submission_reviews_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
) -> ApiResult<ApiJson<Vec<ReviewAssignmentResponse>>> {
    let reviews = state
        .review_service
        .list_reviews_for_submission(&user, submission_id)
        .await?
        .into_iter()
        .map(ReviewAssignmentResponse::from)
        .collect();

    Ok(ApiEnvelope::data(reviews))
}

pub async fn assign_reviewer_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
    Json(payload): Json<AssignReviewerRequest>,
) -> ApiResult<(StatusCode, ApiJson<ReviewAssignmentResponse>)> {
    let date_due = payload
        .date_due
        .as_deref()
        .map(|value| parse_timestamp("date_due", value))
        .transpose()?;

    let assignment = state
        .review_service
        .assign_reviewer(
            &user,
            submission_id,
            parse_user_id(&payload.reviewer_id)?,
            date_due,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(
            ReviewAssignmentResponse::from(assignment),
            "reviewer assigned",
        ),
    ))
}

pub async fn list_my_reviews_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<ApiJson<Vec<ReviewAssignmentResponse>>> {
    let reviews = state
        .review_service
        .list_my_reviews(&user)
        .await?
        .into_iter()
        .map(ReviewAssignmentResponse::from)
        .collect();

    Ok(ApiEnvelope::data(reviews))
}

pub async fn respond_to_review_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<i64>,
    Json(payload): Json<RespondToReviewRequest>,
) -> ApiResult<ApiJson<ReviewAssignmentResponse>> {
    let assignment = state
        .review_service
        .respond_to_review(
            &user,
            assignment_id,
            parse_review_response(&payload.response)?,
        )
        .await?;

    Ok(ApiEnvelope::data(ReviewAssignmentResponse::from(assignment)))
}

pub async fn complete_review_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<i64>,
    Json(payload): Json<CompleteReviewRequest>,
) -> ApiResult<ApiJson<ReviewAssignmentResponse>> {
    let recommendation = payload.recommendation.trim().parse::<ReviewRecommendation>()?;
    let assignment = state
        .review_service
        .complete_review(&user, assignment_id, recommendation)
        .await?;

    Ok(ApiEnvelope::data_with_message(
        ReviewAssignmentResponse::from(assignment),
        "review completed",
    ))
}

pub async fn delete_review_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(assignment_id): Path<i64>,
) -> ApiResult<ApiJson<()>> {
    state
        .review_service
        .delete_review_assignment(&user, assignment_id)
        .await?;

    Ok(ApiEnvelope::message("review assignment deleted"))
}
