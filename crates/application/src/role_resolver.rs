use std::sync::Arc;

use tracing::warn;

use folio_core::{AppError, AppResult, JournalId, UserId, UserIdentity};
use folio_domain::{LegacyRoleId, RoleContext, RolePath, legacy_role_ids_for_paths};

use crate::{RoleGrant, RoleGrantRepository, UserGroupMembership, UserGroupRepository};


/// Roles held by one user in both role stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleSummary {
    /// Rows of the flat role table.
    pub grants: Vec<RoleGrant>,
    /// Legacy group memberships.
    pub memberships: Vec<UserGroupMembership>,
}

/// Answers role questions for site-wide and journal-scoped checks.
///
/// Site checks read the flat table, with a legacy fallback for `admin` only.
/// Journal checks read the legacy group memberships only.
#[derive(Clone)]
pub struct RoleResolver {
    grant_repository: Arc<dyn RoleGrantRepository>,
    group_repository: Arc<dyn UserGroupRepository>,
}

impl RoleResolver {
    /// Creates a resolver over both role stores.
    #[must_use]
    pub fn new(
        grant_repository: Arc<dyn RoleGrantRepository>,
        group_repository: Arc<dyn UserGroupRepository>,
    ) -> Self {
        Self {
            grant_repository,
            group_repository,
        }
    }

    /// Returns whether the user holds `role_path` site-wide.
    ///
    /// Lookup failures are logged and count as "not held".
    pub async fn has_user_site_role(&self, user_id: UserId, role_path: &str) -> bool {
        match self
            .grant_repository
            .has_role_grant(user_id, role_path, RoleContext::Site)
            .await
        {
            Ok(true) => return true,
            Ok(false) => {}
            Err(error) => {
                warn!(%user_id, role_path, %error, "site role lookup failed in user_account_roles");
            }
        }

        if role_path != RolePath::Admin.as_str() {
            return false;
        }

        match self
            .group_repository
            .has_site_membership(user_id, LegacyRoleId::SITE_ADMIN)
            .await
        {
            Ok(found) => found,
            Err(error) => {
                warn!(%user_id, %error, "site admin lookup failed in user_groups");
                false
            }
        }
    }

    /// Returns whether the user holds any of `role_paths` in the journal.
    ///
    /// Only legacy group memberships are consulted. Paths without a legacy
    /// role id are ignored; when none remain the answer is `false`.
    pub async fn has_user_journal_role<S>(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        role_paths: &[S],
    ) -> bool
    where
        S: AsRef<str> + Sync,
    {
        let role_ids = legacy_role_ids_for_paths(role_paths);
        if role_ids.is_empty() {
            return false;
        }

        match self
            .group_repository
            .has_journal_membership(user_id, journal_id, role_ids.as_slice())
            .await
        {
            Ok(found) => found,
            Err(error) => {
                warn!(%user_id, %journal_id, %error, "journal role lookup failed in user_groups");
                false
            }
        }
    }

    /// Returns whether the user is a site administrator.
    pub async fn is_site_admin(&self, user_id: UserId) -> bool {
        self.has_user_site_role(user_id, RolePath::Admin.as_str())
            .await
    }

    /// Returns whether the user is a site administrator or holds one of `roles` in the journal.
    pub async fn has_site_admin_or_journal_role(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        roles: &[RolePath],
    ) -> bool {
        if self.is_site_admin(user_id).await {
            return true;
        }

        let role_paths: Vec<&str> = roles.iter().map(RolePath::as_str).collect();
        self.has_user_journal_role(user_id, journal_id, role_paths.as_slice())
            .await
    }

    /// Ensures the actor holds `role` site-wide.
    pub async fn require_site_role(&self, actor: &UserIdentity, role: RolePath) -> AppResult<()> {
        if self.has_user_site_role(actor.user_id(), role.as_str()).await {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing site role '{role}'",
            actor.user_id()
        )))
    }

    /// Ensures the actor holds one of `roles` in the journal.
    pub async fn require_journal_role(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
        roles: &[RolePath],
    ) -> AppResult<()> {
        let role_paths: Vec<&str> = roles.iter().map(RolePath::as_str).collect();
        if self
            .has_user_journal_role(actor.user_id(), journal_id, role_paths.as_slice())
            .await
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing roles [{}] in journal {journal_id}",
            actor.user_id(),
            role_paths.join(", ")
        )))
    }

    /// Ensures the actor is a site administrator or holds one of `roles` in the journal.
    pub async fn require_site_admin_or_journal_role(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
        roles: &[RolePath],
    ) -> AppResult<()> {
        if self
            .has_site_admin_or_journal_role(actor.user_id(), journal_id, roles)
            .await
        {
            return Ok(());
        }

        let role_paths: Vec<&str> = roles.iter().map(RolePath::as_str).collect();
        Err(AppError::Forbidden(format!(
            "user '{}' must be a site admin or hold [{}] in journal {journal_id}",
            actor.user_id(),
            role_paths.join(", ")
        )))
    }

    /// Lists the rows of both role stores held by one user.
    pub async fn list_user_roles(&self, user_id: UserId) -> AppResult<UserRoleSummary> {
        let grants = self
            .grant_repository
            .list_role_grants_for_user(user_id)
            .await?;
        let memberships = self
            .group_repository
            .list_memberships_for_user(user_id)
            .await?;

        Ok(UserRoleSummary {
            grants,
            memberships,
        })
    }
}
