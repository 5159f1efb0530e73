use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use folio_application::RegisterUserInput;
use folio_core::AppError;
use tower_sessions::Session;
use tracing::warn;

use crate::dto::{ApiEnvelope, ApiJson, BootstrapRequest, BootstrapResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::establish_session;

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, ApiJson<BootstrapResponse>)> {
    if payload.token != state.bootstrap_token {
        warn!("bootstrap attempted with an invalid token");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let (account, report) = state
        .user_service
        .bootstrap_site_admin(RegisterUserInput {
            email: payload.email,
            display_name: payload.display_name,
            password: payload.password,
        })
        .await?;

    establish_session(&session, &account.identity()).await?;

    let message = if report.is_complete() {
        "site administrator created"
    } else {
        "site administrator created; role stores are out of sync"
    };
    Ok((
        StatusCode::CREATED,
        ApiEnvelope::data_with_message(BootstrapResponse::new(account, report), message),
    ))
}
