use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_core::UserIdentity;

use crate::dto::{
    ApiEnvelope, ApiJson, CreateJournalRequest, JournalResponse, JournalSettingResponse,
    UpdateJournalRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_journal_id;

pub async fn list_journals_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<ApiJson<Vec<JournalResponse>>> {
    let journals = state
        .journal_service
        .list_journals(&user)
        .await?
        .into_iter()
        .map(JournalResponse::from)
        .collect();

    Ok(ApiEnvelope::data(journals))
}

pub async fn create_journal_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateJournalRequest>,
) -> ApiResult<(StatusCode, ApiJson<JournalResponse>)> {
    let journal = state
        .journal_service
        .create_journal(&user, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(JournalResponse::from(journal), "journal created"),
    ))
}

pub async fn get_journal_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
) -> ApiResult<ApiJson<JournalResponse>> {
    let journal = state
        .journal_service
        .get_journal(&user, parse_journal_id(journal_id)?)
        .await?;

    Ok(ApiEnvelope::data(JournalResponse::from(journal)))
}

pub async fn get_journal_by_path_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(path): Path<String>,
) -> ApiResult<ApiJson<JournalResponse>> {
    let journal = state
        .journal_service
        .get_journal_by_path(&user, &path)
        .await?;

    Ok(ApiEnvelope::data(JournalResponse::from(journal)))
}

pub async fn update_journal_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
    Json(payload): Json<UpdateJournalRequest>,
) -> ApiResult<ApiJson<JournalResponse>> {
    let journal = state
        .journal_service
        .update_journal(&user, parse_journal_id(journal_id)?, payload.into())
        .await?;

    Ok(ApiEnvelope::data_with_message(
        JournalResponse::from(journal),
        "journal updated",
    ))
}

pub async fn delete_journal_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
) -> ApiResult<ApiJson<()>> {
    state
        .journal_service
        .delete_journal(&user, parse_journal_id(journal_id)?)
        .await?;

    Ok(ApiEnvelope::message("journal deleted"))
}

pub async fn list_journal_settings_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(journal_id): Path<i64>,
) -> ApiResult<ApiJson<Vec<JournalSettingResponse>>> {
    let settings = state
        .journal_service
        .list_journal_settings(&user, parse_journal_id(journal_id)?)
        .await?
        .into_iter()
        .map(JournalSettingResponse::from)
        .collect();

    Ok(ApiEnvelope::data(settings))
}
