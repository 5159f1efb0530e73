use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use folio_core::UserIdentity;

use crate::dto::{
    AnnouncementListQuery, AnnouncementResponse, ApiEnvelope, ApiJson, CreateAnnouncementRequest,
    UpdateAnnouncementRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_announcements_handler(
    State(state): State<AppState>,
    Query(query): Query<AnnouncementListQuery>,
) -> ApiResult<ApiJson<Vec<AnnouncementResponse>>> {
    let announcements = state
        .announcement_service
        .list_announcements(query.into_query()?)
        .await?
        .into_iter()
        .map(AnnouncementResponse::from)
        .collect();

    Ok(ApiEnvelope::data(announcements))
}

pub async fn create_announcement_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> ApiResult<(StatusCode, ApiJson<AnnouncementResponse>)> {
    let announcement = state
        .announcement_service
        .create_announcement(&user, payload.into_input()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(
            AnnouncementResponse::from(announcement),
            "announcement posted",
        ),
    ))
}

pub async fn get_announcement_handler(
    State(state): State<AppState>,
    Path(announcement_id): Path<i64>,
) -> ApiResult<ApiJson<AnnouncementResponse>> {
    let announcement = state
        .announcement_service
        .get_announcement(announcement_id)
        .await?;

    Ok(ApiEnvelope::data(AnnouncementResponse::from(announcement)))
}

pub async fn update_announcement_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(announcement_id): Path<i64>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> ApiResult<ApiJson<AnnouncementResponse>> {
    let announcement = state
        .announcement_service
        .update_announcement(&user, announcement_id, payload.into_input()?)
        .await?;

    Ok(ApiEnvelope::data_with_message(
        AnnouncementResponse::from(announcement),
        "announcement updated",
    ))
}

pub async fn delete_announcement_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(announcement_id): Path<i64>,
) -> ApiResult<ApiJson<()>> {
    state
        .announcement_service
        .delete_announcement(&user, announcement_id)
        .await?;

    Ok(ApiEnvelope::message("announcement deleted"))
}
