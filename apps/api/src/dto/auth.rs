use folio_application::{RoleSyncReport, UserAccount};
use folio_core::UserIdentity;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::roles::RoleSyncReportResponse;
use super::users::UserResponse;

/// Incoming payload for creating the first site administrator.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Result of a successful bootstrap.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-response.ts"
)]
pub struct BootstrapResponse {
    pub user: UserResponse,
    pub role_sync: RoleSyncReportResponse,
}

impl BootstrapResponse {
    pub fn new(account: UserAccount, report: RoleSyncReport) -> Self {
        Self {
            user: UserResponse::from(account),
            role_sync: RoleSyncReportResponse::from(report),
        }
    }
}

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub is_site_admin: bool,
}

impl UserIdentityResponse {
    pub fn from_identity(identity: &UserIdentity, is_site_admin: bool) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().to_owned(),
            is_site_admin,
        }
    }
}
