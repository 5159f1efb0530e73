use axum::Json;
use axum::extract::{Extension, Query, State};
use folio_core::{AppResult, JournalId, UserId, UserIdentity};
use folio_domain::{RoleContext, RolePath};

use crate::dto::{
    ApiEnvelope, ApiJson, JournalRoleCheckQuery, RoleChangeRequest, RoleCheckResponse,
    RoleSyncReportResponse, SiteRoleCheckQuery, UserRolesResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{parse_journal_id, parse_user_id};

fn role_change(payload: &RoleChangeRequest) -> AppResult<(UserId, RolePath, RoleContext)> {
    let user_id = parse_user_id(&payload.user_id)?;
    let role = RolePath::from_transport(&payload.role)?;
    let context = match payload.journal_id {
        Some(journal_id) => RoleContext::Journal(JournalId::new(journal_id)?),
        None => RoleContext::Site,
    };

    Ok((user_id, role, context))
}

fn sync_message(report: &RoleSyncReportResponse, action: &str) -> String {
    if report.complete {
        format!("role {action}")
    } else {
        format!("role {action} in one store only; role stores are out of sync")
    }
}

pub async fn grant_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleChangeRequest>,
) -> ApiResult<ApiJson<RoleSyncReportResponse>> {
    let (user_id, role, context) = role_change(&payload)?;
    let report = RoleSyncReportResponse::from(
        state
            .role_sync_service
            .grant_role(&user, user_id, role, context)
            .await?,
    );

    let message = sync_message(&report, "granted");
    Ok(ApiEnvelope::data_with_message(report, message))
}

pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleChangeRequest>,
) -> ApiResult<ApiJson<RoleSyncReportResponse>> {
    let (user_id, role, context) = role_change(&payload)?;
    let report = RoleSyncReportResponse::from(
        state
            .role_sync_service
            .revoke_role(&user, user_id, role, context)
            .await?,
    );

    let message = sync_message(&report, "revoked");
    Ok(ApiEnvelope::data_with_message(report, message))
}

/// Resolves the user a role check targets. Checking someone else requires site admin.
async fn check_target(
    state: &AppState,
    user: &UserIdentity,
    requested: Option<&str>,
) -> AppResult<UserId> {
    let Some(requested) = requested else {
        return Ok(user.user_id());
    };

    let target = parse_user_id(requested)?;
    if target != user.user_id() {
        state
            .role_resolver
            .require_site_role(user, RolePath::Admin)
            .await?;
    }

    Ok(target)
}

pub async fn check_site_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<SiteRoleCheckQuery>,
) -> ApiResult<ApiJson<RoleCheckResponse>> {
    let target = check_target(&state, &user, query.user_id.as_deref()).await?;
    let has_role = state
        .role_resolver
        .has_user_site_role(target, query.role.trim())
        .await;

    Ok(ApiEnvelope::data(RoleCheckResponse {
        user_id: target.to_string(),
        has_role,
    }))
}

pub async fn check_journal_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<JournalRoleCheckQuery>,
) -> ApiResult<ApiJson<RoleCheckResponse>> {
    let target = check_target(&state, &user, query.user_id.as_deref()).await?;
    let journal_id = parse_journal_id(query.journal_id)?;
    let has_role = state
        .role_resolver
        .has_user_journal_role(target, journal_id, &query.role_paths())
        .await;

    Ok(ApiEnvelope::data(RoleCheckResponse {
        user_id: target.to_string(),
        has_role,
    }))
}

pub async fn my_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<ApiJson<UserRolesResponse>> {
    let summary = state.role_resolver.list_user_roles(user.user_id()).await?;
    let is_site_admin = state.role_resolver.is_site_admin(user.user_id()).await;

    Ok(ApiEnvelope::data(UserRolesResponse::new(
        user.user_id().to_string(),
        is_site_admin,
        summary,
    )))
}
