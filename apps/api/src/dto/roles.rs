use folio_application::{RoleGrant, RoleSyncReport, UserGroupMembership, UserRoleSummary};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for granting or revoking a role.
///
/// Without `journal_id` the role applies site-wide.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-change-request.ts"
)]
pub struct RoleChangeRequest {
    pub user_id: String,
    pub role: String,
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
}

/// Outcome of a grant or revoke across both role stores.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-sync-report-response.ts"
)]
pub struct RoleSyncReportResponse {
    pub role: String,
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
    pub flat_synced: bool,
    pub legacy_synced: bool,
    pub complete: bool,
    #[ts(type = "number")]
    pub removed_grants: u64,
    #[ts(type = "number")]
    pub removed_memberships: u64,
}

impl From<RoleSyncReport> for RoleSyncReportResponse {
    fn from(value: RoleSyncReport) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            journal_id: value.context.flat_context_id(),
            flat_synced: value.flat_synced,
            legacy_synced: value.legacy_synced,
            complete: value.is_complete(),
            removed_grants: value.removed_grants,
            removed_memberships: value.removed_memberships,
        }
    }
}

/// Query string for a site role check.
#[derive(Debug, Deserialize)]
pub struct SiteRoleCheckQuery {
    pub role: String,
    pub user_id: Option<String>,
}

/// Query string for a journal role check; `roles` is comma separated.
#[derive(Debug, Deserialize)]
pub struct JournalRoleCheckQuery {
    pub journal_id: i64,
    pub roles: String,
    pub user_id: Option<String>,
}

impl JournalRoleCheckQuery {
    /// Splits the comma separated role list, dropping blanks.
    pub fn role_paths(&self) -> Vec<&str> {
        self.roles
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .collect()
    }
}

/// Result of a role check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-check-response.ts"
)]
pub struct RoleCheckResponse {
    pub user_id: String,
    pub has_role: bool,
}

/// Flat role grant row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-grant-response.ts"
)]
pub struct RoleGrantResponse {
    pub role: String,
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
}

impl From<RoleGrant> for RoleGrantResponse {
    fn from(value: RoleGrant) -> Self {
        Self {
            role: value.role_name,
            journal_id: value.context.flat_context_id(),
        }
    }
}

/// Legacy group membership row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-membership-response.ts"
)]
pub struct RoleMembershipResponse {
    #[ts(type = "number")]
    pub user_group_id: i64,
    #[ts(type = "number")]
    pub role_id: i64,
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
}

impl From<UserGroupMembership> for RoleMembershipResponse {
    fn from(value: UserGroupMembership) -> Self {
        Self {
            user_group_id: value.user_group_id,
            role_id: value.role_id.as_i64(),
            journal_id: value.context.flat_context_id(),
        }
    }
}

/// Roles held by one user in both stores.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-roles-response.ts"
)]
pub struct UserRolesResponse {
    pub user_id: String,
    pub is_site_admin: bool,
    pub grants: Vec<RoleGrantResponse>,
    pub memberships: Vec<RoleMembershipResponse>,
}

impl UserRolesResponse {
    pub fn new(user_id: String, is_site_admin: bool, summary: UserRoleSummary) -> Self {
        Self {
            user_id,
            is_site_admin,
            grants: summary.grants.into_iter().map(RoleGrantResponse::from).collect(),
            memberships: summary
                .memberships
                .into_iter()
                .map(RoleMembershipResponse::from)
                .collect(),
        }
    }
}
