use axum::Json;
use axum::extract::State;
use folio_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{ApiEnvelope, ApiJson, LoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::establish_session;

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<ApiJson<UserIdentityResponse>> {
    let account = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_owned()))?;

    let identity = account.identity();
    establish_session(&session, &identity).await?;
    info!(user_id = %identity.user_id(), "user signed in");

    let is_site_admin = state.role_resolver.is_site_admin(identity.user_id()).await;
    Ok(ApiEnvelope::data(UserIdentityResponse::from_identity(
        &identity,
        is_site_admin,
    )))
}
