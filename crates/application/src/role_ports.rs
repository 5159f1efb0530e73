use async_trait::async_trait;

use folio_core::{AppResult, JournalId, UserId};
use folio_domain::{LegacyRoleId, RoleContext};

/// Row of the flat `user_account_roles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// Account holding the role.
    pub user_id: UserId,
    /// Stored role path. Rows written outside the application may hold unknown names.
    pub role_name: String,
    /// Site-wide or journal scope.
    pub context: RoleContext,
}

/// Legacy user group keyed by numeric role id and context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroup {
    /// Group primary key.
    pub user_group_id: i64,
    /// Legacy role id of the group.
    pub role_id: LegacyRoleId,
    /// Site-wide or journal scope.
    pub context: RoleContext,
    /// Seeded when the journal was created.
    pub is_default: bool,
}

/// Membership of a user in a legacy user group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroupMembership {
    /// Group primary key.
    pub user_group_id: i64,
    /// Member account.
    pub user_id: UserId,
    /// Legacy role id of the group.
    pub role_id: LegacyRoleId,
    /// Scope of the group.
    pub context: RoleContext,
}

/// Repository port for the flat role table.
#[async_trait]
pub trait RoleGrantRepository: Send + Sync {
    /// Returns whether a row exists for exactly this user, role and context.
    async fn has_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<bool>;

    /// Inserts a row. Inserting an existing row is a no-op.
    async fn insert_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<()>;

    /// Deletes the matching row and returns the number of removed rows.
    async fn delete_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<u64>;

    /// Lists every row held by one user.
    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>>;

    /// Counts holders of a role in one context.
    async fn count_role_grants(&self, role_name: &str, context: RoleContext) -> AppResult<i64>;
}

/// Repository port for legacy user groups and their memberships.
#[async_trait]
pub trait UserGroupRepository: Send + Sync {
    /// Returns whether the user belongs to a site-wide group (context `0` or `NULL`) with this role id.
    async fn has_site_membership(&self, user_id: UserId, role_id: LegacyRoleId)
    -> AppResult<bool>;

    /// Counts members of site-wide groups (context `0` or `NULL`) with this role id.
    async fn count_site_memberships(&self, role_id: LegacyRoleId) -> AppResult<i64>;

    /// Returns whether the user belongs to a group of this journal with any of the role ids.
    async fn has_journal_membership(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        role_ids: &[LegacyRoleId],
    ) -> AppResult<bool>;

    /// Finds all groups for a context and role id, ordered by id.
    async fn find_user_groups(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
    ) -> AppResult<Vec<UserGroup>>;

    /// Creates a group for a context and role id.
    async fn create_user_group(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
        is_default: bool,
    ) -> AppResult<UserGroup>;

    /// Adds a membership row. Adding an existing membership is a no-op.
    async fn add_membership(&self, user_group_id: i64, user_id: UserId) -> AppResult<()>;

    /// Removes the user from the listed groups and returns the number of removed rows.
    async fn remove_memberships(&self, user_id: UserId, user_group_ids: &[i64]) -> AppResult<u64>;

    /// Lists every membership of one user.
    async fn list_memberships_for_user(&self, user_id: UserId)
    -> AppResult<Vec<UserGroupMembership>>;
}
