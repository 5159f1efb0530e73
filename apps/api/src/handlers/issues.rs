use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_core::UserIdentity;

use crate::dto::{ApiEnvelope, ApiJson, IssueRequest, IssueResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_journal_id;

pub async fn list_issues_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
) -> ApiResult<ApiJson<Vec<IssueResponse>>> {
    let issues = state
        .issue_service
        .list_issues(&user, parse_journal_id(journal_id)?)
        .await?
        .into_iter()
        .map(IssueResponse::from)
        .collect();

    Ok(ApiEnvelope::data(issues))
}

pub async fn create_issue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
    Json(payload): Json<IssueRequest>,
) -> ApiResult<(StatusCode, ApiJson<IssueResponse>)> {
    let issue = state
        .issue_service
        .create_issue(&user, parse_journal_id(journal_id)?, payload.fields())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(IssueResponse::from(issue), "issue created"),
    ))
}

pub async fn get_issue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(issue_id): Path<i64>,
) -> ApiResult<ApiJson<IssueResponse>> {
    let issue = state.issue_service.get_issue(&user, issue_id).await?;
    Ok(ApiEnvelope::data(IssueResponse::from(issue)))
}

pub async fn update_issue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(issue_id): Path<i64>,
    Json(payload): Json<IssueRequest>,
) -> ApiResult<ApiJson<IssueResponse>> {
    let issue = state
        .issue_service
        .update_issue(&user, issue_id, payload.into())
        .await?;

    Ok(ApiEnvelope::data_with_message(
        IssueResponse::from(issue),
        "issue updated",
    ))
}

pub async fn delete_issue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(issue_id): Path<i64>,
) -> ApiResult<ApiJson<()>> {
    state.issue_service.delete_issue(&user, issue_id).await?;
    Ok(ApiEnvelope::message("issue deleted"))
}
