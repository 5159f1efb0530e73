use axum::extract::State;
use folio_core::AppError;
use tower_sessions::Session;
use tracing::info;

use crate::dto::{ApiEnvelope, ApiJson, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_identity;

pub async fn logout_handler(session: Session) -> ApiResult<ApiJson<()>> {
    let identity = session_identity(&session).await?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = identity {
        info!(user_id = %identity.user_id(), "user signed out");
    }
    Ok(ApiEnvelope::message("signed out"))
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<ApiJson<UserIdentityResponse>> {
    let identity = session_identity(&session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let is_site_admin = state.role_resolver.is_site_admin(identity.user_id()).await;
    Ok(ApiEnvelope::data(UserIdentityResponse::from_identity(
        &identity,
        is_site_admin,
    )))
}
