//! PostgreSQL adapters for the flat role table and the legacy user groups.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use folio_application::{
    RoleGrant, RoleGrantRepository, UserGroup, UserGroupMembership, UserGroupRepository,
};
use folio_core::{AppError, AppResult, JournalId, UserId};
use folio_domain::{LegacyRoleId, RoleContext};

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the `user_account_roles` port.
#[derive(Clone)]
pub struct PostgresRoleGrantRepository {
    pool: PgPool,
}

impl PostgresRoleGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// PostgreSQL implementation of the `user_groups` port.
#[derive(Clone)]
pub struct PostgresUserGroupRepository {
    pool: PgPool,
}

impl PostgresUserGroupRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    user_id: uuid::Uuid,
    role_name: String,
    context_id: Option<i64>,
}

impl TryFrom<RoleGrantRow> for RoleGrant {
    type Error = AppError;

    fn try_from(row: RoleGrantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            role_name: row.role_name,
            context: RoleContext::from_flat(row.context_id)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserGroupRow {
    user_group_id: i64,
    role_id: i64,
    context_id: Option<i64>,
    is_default: bool,
}

impl TryFrom<UserGroupRow> for UserGroup {
    type Error = AppError;

    fn try_from(row: UserGroupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_group_id: row.user_group_id,
            role_id: LegacyRoleId::from_stored(row.role_id),
            context: RoleContext::from_legacy(row.context_id)?,
            is_default: row.is_default,
        })
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    user_group_id: i64,
    user_id: uuid::Uuid,
    role_id: i64,
    context_id: Option<i64>,
}

impl TryFrom<MembershipRow> for UserGroupMembership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_group_id: row.user_group_id,
            user_id: UserId::from_uuid(row.user_id),
            role_id: LegacyRoleId::from_stored(row.role_id),
            context: RoleContext::from_legacy(row.context_id)?,
        })
    }
}

#[async_trait]
impl RoleGrantRepository for PostgresRoleGrantRepository {
    async fn has_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_account_roles
                WHERE user_id = $1
                  AND role_name = $2
                  AND context_id IS NOT DISTINCT FROM $3
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name)
        .bind(context.flat_context_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up role grant: {error}")))
    }

    async fn insert_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_account_roles (user_id, role_name, context_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name)
        .bind(context.flat_context_id())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert role grant: {error}")))?;

        Ok(())
    }

    async fn delete_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_account_roles
            WHERE user_id = $1
              AND role_name = $2
              AND context_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name)
        .bind(context.flat_context_id())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role grant: {error}")))?;

        Ok(result.rows_affected())
    }

    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        let rows = sqlx::query_as::<_, RoleGrantRow>(
            r#"
            SELECT user_id, role_name, context_id
            FROM user_account_roles
            WHERE user_id = $1
            ORDER BY context_id NULLS FIRST, role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role grants: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let context_id = row.context_id;
                RoleGrant::try_from(row)
                    .inspect_err(|error| {
                        warn!(%user_id, ?context_id, %error, "skipping role grant with unmapped context");
                    })
                    .ok()
            })
            .collect())
    }

    async fn count_role_grants(&self, role_name: &str, context: RoleContext) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_account_roles
            WHERE role_name = $1
              AND context_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(role_name)
        .bind(context.flat_context_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count role grants: {error}")))
    }
}

#[async_trait]
impl UserGroupRepository for PostgresUserGroupRepository {
    async fn has_site_membership(
        &self,
        user_id: UserId,
        role_id: LegacyRoleId,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_user_groups uug
                JOIN user_groups ug ON ug.user_group_id = uug.user_group_id
                WHERE uug.user_id = $1
                  AND ug.role_id = $2
                  AND (ug.context_id = 0 OR ug.context_id IS NULL)
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to look up site group membership: {error}"))
        })
    }

    async fn count_site_memberships(&self, role_id: LegacyRoleId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_user_groups uug
            JOIN user_groups ug ON ug.user_group_id = uug.user_group_id
            WHERE ug.role_id = $1
              AND (ug.context_id = 0 OR ug.context_id IS NULL)
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count site group memberships: {error}"))
        })
    }

    async fn has_journal_membership(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        role_ids: &[LegacyRoleId],
    ) -> AppResult<bool> {
        let role_ids: Vec<i64> = role_ids.iter().map(LegacyRoleId::as_i64).collect();

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_user_groups uug
                JOIN user_groups ug ON ug.user_group_id = uug.user_group_id
                WHERE uug.user_id = $1
                  AND ug.context_id = $2
                  AND ug.role_id = ANY($3)
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(journal_id.as_i64())
        .bind(role_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to look up journal group membership: {error}"
            ))
        })
    }

    async fn find_user_groups(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
    ) -> AppResult<Vec<UserGroup>> {
        let rows = sqlx::query_as::<_, UserGroupRow>(
            r#"
            SELECT user_group_id, role_id, context_id, is_default
            FROM user_groups
            WHERE COALESCE(context_id, 0) = $1
              AND role_id = $2
            ORDER BY user_group_id
            "#,
        )
        .bind(context.legacy_context_id())
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user groups: {error}")))?;

        rows.into_iter().map(UserGroup::try_from).collect()
    }

    async fn create_user_group(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
        is_default: bool,
    ) -> AppResult<UserGroup> {
        let row = sqlx::query_as::<_, UserGroupRow>(
            r#"
            INSERT INTO user_groups (context_id, role_id, is_default)
            VALUES ($1, $2, $3)
            RETURNING user_group_id, role_id, context_id, is_default
            "#,
        )
        .bind(context.legacy_context_id())
        .bind(role_id.as_i64())
        .bind(is_default)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create user group: {error}")))?;

        UserGroup::try_from(row)
    }

    async fn add_membership(&self, user_group_id: i64, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_user_groups (user_group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_group_id, user_id) DO NOTHING
            "#,
        )
        .bind(user_group_id)
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to add user group membership: {error}"))
        })?;

        Ok(())
    }

    async fn remove_memberships(&self, user_id: UserId, user_group_ids: &[i64]) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_user_groups
            WHERE user_id = $1
              AND user_group_id = ANY($2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(user_group_ids)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove user group memberships: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserGroupMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT uug.user_group_id, uug.user_id, ug.role_id, ug.context_id
            FROM user_user_groups uug
            JOIN user_groups ug ON ug.user_group_id = uug.user_group_id
            WHERE uug.user_id = $1
            ORDER BY COALESCE(ug.context_id, 0), ug.role_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list user group memberships: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let context_id = row.context_id;
                UserGroupMembership::try_from(row)
                    .inspect_err(|error| {
                        warn!(%user_id, ?context_id, %error, "skipping group membership with unmapped context");
                    })
                    .ok()
            })
            .collect())
    }
}
