use std::sync::Arc;

use tracing::{error, info};

use folio_core::{AppError, AppResult, UserId, UserIdentity};
use folio_domain::{RoleContext, RolePath};

use crate::{
    JournalRepository, RoleGrantRepository, RoleResolver, UserGroupRepository, UserRepository,
};


/// Outcome of writing one role change to both role stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSyncReport {
    /// Role that was granted or revoked.
    pub role: RolePath,
    /// Scope of the change.
    pub context: RoleContext,
    /// Whether the flat table write succeeded.
    pub flat_synced: bool,
    /// Whether every legacy group write succeeded.
    pub legacy_synced: bool,
    /// Flat rows removed by a revoke.
    pub removed_grants: u64,
    /// Legacy memberships removed by a revoke.
    pub removed_memberships: u64,
}

impl RoleSyncReport {
    /// Returns whether both stores now agree on the change.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.flat_synced && self.legacy_synced
    }
}

/// Writes role grants and revocations to the flat table and the legacy groups.
///
/// Every step is a separate repository call. A failed step is logged and the
/// remaining steps still run; nothing is rolled back.
#[derive(Clone)]
pub struct RoleSyncService {
    resolver: RoleResolver,
    grant_repository: Arc<dyn RoleGrantRepository>,
    group_repository: Arc<dyn UserGroupRepository>,
    user_repository: Arc<dyn UserRepository>,
    journal_repository: Arc<dyn JournalRepository>,
}

impl RoleSyncService {
    /// Creates a synchronizer from its dependencies.
    #[must_use]
    pub fn new(
        resolver: RoleResolver,
        grant_repository: Arc<dyn RoleGrantRepository>,
        group_repository: Arc<dyn UserGroupRepository>,
        user_repository: Arc<dyn UserRepository>,
        journal_repository: Arc<dyn JournalRepository>,
    ) -> Self {
        Self {
            resolver,
            grant_repository,
            group_repository,
            user_repository,
            journal_repository,
        }
    }

    /// Grants a role after checking that the actor may manage it.
    pub async fn grant_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<RoleSyncReport> {
        self.require_role_authority(actor, role, context).await?;
        self.ensure_target_exists(user_id, context).await?;

        let report = self.grant_role_unchecked(user_id, role, context).await?;
        info!(
            actor = %actor.user_id(),
            %user_id,
            role = role.as_str(),
            %context,
            complete = report.is_complete(),
            "role granted"
        );
        Ok(report)
    }

    /// Revokes a role after checking that the actor may manage it.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<RoleSyncReport> {
        self.require_role_authority(actor, role, context).await?;
        validate_role_context(role, context)?;

        let report = self.revoke_role_unchecked(user_id, role, context).await?;
        info!(
            actor = %actor.user_id(),
            %user_id,
            role = role.as_str(),
            %context,
            removed_grants = report.removed_grants,
            removed_memberships = report.removed_memberships,
            complete = report.is_complete(),
            "role revoked"
        );
        Ok(report)
    }

    /// Writes a grant to both stores without an authorization check.
    ///
    /// Fails only when neither store accepted the grant.
    pub async fn grant_role_unchecked(
        &self,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<RoleSyncReport> {
        validate_role_context(role, context)?;

        let flat_synced = match self
            .grant_repository
            .insert_role_grant(user_id, role.as_str(), context)
            .await
        {
            Ok(()) => true,
            Err(failure) => {
                error!(%user_id, role = role.as_str(), %context, error = %failure, "failed to write user_account_roles");
                false
            }
        };

        let legacy_synced = match self.add_legacy_membership(user_id, role, context).await {
            Ok(()) => true,
            Err(failure) => {
                error!(%user_id, role = role.as_str(), %context, error = %failure, "failed to write user_groups membership");
                false
            }
        };

        finish_report(
            RoleSyncReport {
                role,
                context,
                flat_synced,
                legacy_synced,
                removed_grants: 0,
                removed_memberships: 0,
            },
            "grant",
        )
    }

    async fn revoke_role_unchecked(
        &self,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<RoleSyncReport> {
        let (flat_synced, removed_grants) = match self
            .grant_repository
            .delete_role_grant(user_id, role.as_str(), context)
            .await
        {
            Ok(removed) => (true, removed),
            Err(failure) => {
                error!(%user_id, role = role.as_str(), %context, error = %failure, "failed to delete from user_account_roles");
                (false, 0)
            }
        };

        let (legacy_synced, removed_memberships) =
            match self.remove_legacy_memberships(user_id, role, context).await {
                Ok(removed) => (true, removed),
                Err(failure) => {
                    error!(%user_id, role = role.as_str(), %context, error = %failure, "failed to delete user_groups memberships");
                    (false, 0)
                }
            };

        finish_report(
            RoleSyncReport {
                role,
                context,
                flat_synced,
                legacy_synced,
                removed_grants,
                removed_memberships,
            },
            "revoke",
        )
    }

    async fn add_legacy_membership(
        &self,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<()> {
        let role_id = role.legacy_role_id();
        let existing = self
            .group_repository
            .find_user_groups(context, role_id)
            .await?;

        let user_group_id = match existing.first() {
            Some(group) => group.user_group_id,
            None => {
                self.group_repository
                    .create_user_group(context, role_id, false)
                    .await?
                    .user_group_id
            }
        };

        self.group_repository
            .add_membership(user_group_id, user_id)
            .await
    }

    async fn remove_legacy_memberships(
        &self,
        user_id: UserId,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<u64> {
        let group_ids: Vec<i64> = self
            .group_repository
            .find_user_groups(context, role.legacy_role_id())
            .await?
            .into_iter()
            .map(|group| group.user_group_id)
            .collect();

        if group_ids.is_empty() {
            return Ok(0);
        }

        self.group_repository
            .remove_memberships(user_id, group_ids.as_slice())
            .await
    }

    async fn require_role_authority(
        &self,
        actor: &UserIdentity,
        role: RolePath,
        context: RoleContext,
    ) -> AppResult<()> {
        match context {
            RoleContext::Journal(journal_id) if role != RolePath::Admin => {
                self.resolver
                    .require_site_admin_or_journal_role(actor, journal_id, &[RolePath::Manager])
                    .await
            }
            _ => self.resolver.require_site_role(actor, RolePath::Admin).await,
        }
    }

    async fn ensure_target_exists(&self, user_id: UserId, context: RoleContext) -> AppResult<()> {
        if self.user_repository.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        if let RoleContext::Journal(journal_id) = context
            && self
                .journal_repository
                .find_journal(journal_id)
                .await?
                .is_none()
        {
            return Err(AppError::NotFound(format!(
                "journal {journal_id} was not found"
            )));
        }

        Ok(())
    }
}

fn validate_role_context(role: RolePath, context: RoleContext) -> AppResult<()> {
    if role == RolePath::Admin && context != RoleContext::Site {
        return Err(AppError::Validation(
            "the admin role can only be held site-wide".to_owned(),
        ));
    }

    Ok(())
}

fn finish_report(report: RoleSyncReport, operation: &str) -> AppResult<RoleSyncReport> {
    if !report.flat_synced && !report.legacy_synced {
        return Err(AppError::Internal(format!(
            "role {operation} of '{}' in {} failed in both role stores",
            report.role, report.context
        )));
    }

    Ok(report)
}
