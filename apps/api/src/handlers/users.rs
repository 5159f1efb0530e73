use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_core::UserIdentity;

use crate::dto::{ApiEnvelope, ApiJson, CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_user_id;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<ApiJson<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(ApiEnvelope::data(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, ApiJson<UserResponse>)> {
    let account = state
        .user_service
        .register_user(&user, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(UserResponse::from(account), "user created"),
    ))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiJson<UserResponse>> {
    let account = state
        .user_service
        .get_user(&user, parse_user_id(&user_id)?)
        .await?;

    Ok(ApiEnvelope::data(UserResponse::from(account)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<ApiJson<UserResponse>> {
    let account = state
        .user_service
        .update_display_name(&user, parse_user_id(&user_id)?, &payload.display_name)
        .await?;

    Ok(ApiEnvelope::data_with_message(
        UserResponse::from(account),
        "user updated",
    ))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiJson<()>> {
    state
        .user_service
        .delete_user(&user, parse_user_id(&user_id)?)
        .await?;

    Ok(ApiEnvelope::message("user deleted"))
}
