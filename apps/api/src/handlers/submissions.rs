use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_core::UserIdentity;

use crate::dto::{
    ApiEnvelope, ApiJson, CreatePublicationRequest, CreateSubmissionRequest, PublicationResponse,
    SubmissionDetailResponse, SubmissionResponse, UpdateSubmissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_journal_id;

pub async fn list_journal_submissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
) -> ApiResult<ApiJson<Vec<SubmissionResponse>>> {
    let submissions = state
        .submission_service
        .list_journal_submissions(&user, parse_journal_id(journal_id)?)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(ApiEnvelope::data(submissions))
}

pub async fn list_my_submissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<ApiJson<Vec<SubmissionResponse>>> {
    let submissions = state
        .submission_service
        .list_my_submissions(&user)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(ApiEnvelope::data(submissions))
}

pub async fn create_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
    Json(payload): Json<CreateSubmissionRequest>,
) -> ApiResult<(StatusCode, ApiJson<SubmissionResponse>)> {
    let submission = state
        .submission_service
        .create_submission(&user, parse_journal_id(journal_id)?, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(SubmissionResponse::from(submission), "submission created"),
    ))
}

pub async fn get_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
) -> ApiResult<ApiJson<SubmissionDetailResponse>> {
    let submission = state
        .submission_service
        .get_submission(&user, submission_id)
        .await?;

    Ok(ApiEnvelope::data(SubmissionDetailResponse::from(submission)))
}

pub async fn update_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
    Json(payload): Json<UpdateSubmissionRequest>,
) -> ApiResult<ApiJson<SubmissionResponse>> {
    let submission = state
        .submission_service
        .update_submission(&user, submission_id, payload.into_changes()?)
        .await?;

    Ok(ApiEnvelope::data_with_message(
        SubmissionResponse::from(submission),
        "submission updated",
    ))
}

pub async fn delete_submission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
) -> ApiResult<ApiJson<()>> {
    state
        .submission_service
        .delete_submission(&user, submission_id)
        .await?;

    Ok(ApiEnvelope::message("submission deleted"))
}

pub async fn create_publication_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(submission_id): Path<i64>,
    Json(payload): Json<CreatePublicationRequest>,
) -> ApiResult<(StatusCode, ApiJson<PublicationResponse>)> {
    let publication = state
        .submission_service
        .create_publication(&user, submission_id, payload.into_input()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(
            PublicationResponse::from(publication),
            "publication created",
        ),
    ))
}
