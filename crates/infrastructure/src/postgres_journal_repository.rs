//! PostgreSQL-backed journal repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use folio_application::{Journal, JournalChanges, JournalRepository, JournalSetting, NewJournal};
use folio_core::{AppError, AppResult, JournalId};


/// PostgreSQL implementation of the journal repository port.
#[derive(Clone)]
pub struct PostgresJournalRepository {
    pool: PgPool,
}

impl PostgresJournalRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JournalRow {
    journal_id: i64,
    path: String,
    name: String,
    description: Option<String>,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JournalRow> for Journal {
    type Error = AppError;

    fn try_from(row: JournalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JournalId::new(row.journal_id)?,
            path: row.path,
            name: row.name,
            description: row.description,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JournalSettingRow {
    setting_name: String,
    setting_value: String,
}

const JOURNAL_COLUMNS: &str = "journal_id, path, name, description, enabled, created_at, updated_at";

#[async_trait]
impl JournalRepository for PostgresJournalRepository {
    async fn create_journal(&self, journal: NewJournal) -> AppResult<Journal> {
        let journal_id = sqlx::query_scalar::<_, i64>(
            "SELECT create_journal_with_settings($1, $2, $3, $4)",
        )
        .bind(journal.path.as_str())
        .bind(journal.name.as_str())
        .bind(journal.description.as_deref())
        .bind(journal.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| path_conflict_or_internal(error, "create journal"))?;

        self.find_journal(JournalId::new(journal_id)?)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("journal {journal_id} vanished after creation"))
            })
    }

    async fn find_journal(&self, journal_id: JournalId) -> AppResult<Option<Journal>> {
        let row = sqlx::query_as::<_, JournalRow>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE journal_id = $1"
        ))
        .bind(journal_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find journal: {error}")))?;

        row.map(Journal::try_from).transpose()
    }

    async fn find_journal_by_path(&self, path: &str) -> AppResult<Option<Journal>> {
        let row = sqlx::query_as::<_, JournalRow>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE path = $1"
        ))
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find journal by path: {error}")))?;

        row.map(Journal::try_from).transpose()
    }

    async fn list_journals(&self, include_disabled: bool) -> AppResult<Vec<Journal>> {
        let rows = sqlx::query_as::<_, JournalRow>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE enabled OR $1 ORDER BY path"
        ))
        .bind(include_disabled)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list journals: {error}")))?;

        rows.into_iter().map(Journal::try_from).collect()
    }

    async fn update_journal(
        &self,
        journal_id: JournalId,
        changes: JournalChanges,
    ) -> AppResult<Option<Journal>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start journal update transaction: {error}"))
        })?;

        let row = sqlx::query_as::<_, JournalRow>(&format!(
            r#"
            UPDATE journals
            SET path = COALESCE($2, path),
                name = COALESCE($3, name),
                description = CASE WHEN $4 THEN NULLIF($5, '') ELSE description END,
                enabled = COALESCE($6, enabled),
                updated_at = now()
            WHERE journal_id = $1
            RETURNING {JOURNAL_COLUMNS}
            "#
        ))
        .bind(journal_id.as_i64())
        .bind(changes.path.as_ref().map(|path| path.as_str()))
        .bind(changes.name.as_ref().map(|name| name.as_str()))
        .bind(changes.description.is_some())
        .bind(changes.description.as_deref())
        .bind(changes.enabled)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| path_conflict_or_internal(error, "update journal"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Keep the seeded name and description settings in step with the journal row.
        sqlx::query(
            r#"
            INSERT INTO journal_settings (journal_id, setting_name, setting_value)
            VALUES ($1, 'name', $2), ($1, 'description', COALESCE($3, ''))
            ON CONFLICT (journal_id, setting_name)
            DO UPDATE SET setting_value = EXCLUDED.setting_value
            "#,
        )
        .bind(row.journal_id)
        .bind(row.name.as_str())
        .bind(row.description.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update journal settings: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit journal update: {error}"))
        })?;

        Journal::try_from(row).map(Some)
    }

    async fn delete_journal(&self, journal_id: JournalId) -> AppResult<bool> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start journal delete transaction: {error}"))
        })?;

        // Role rows reference the journal only through their context column.
        let grants = sqlx::query("DELETE FROM user_account_roles WHERE context_id = $1")
            .bind(journal_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete journal role grants: {error}"))
            })?;

        let groups = sqlx::query("DELETE FROM user_groups WHERE context_id = $1")
            .bind(journal_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete journal user groups: {error}"))
            })?;
        debug!(
            %journal_id,
            grants = grants.rows_affected(),
            groups = groups.rows_affected(),
            "removed journal-scoped role rows"
        );

        let result = sqlx::query("DELETE FROM journals WHERE journal_id = $1")
            .bind(journal_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete journal: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit journal delete: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_journal_settings(&self, journal_id: JournalId) -> AppResult<Vec<JournalSetting>> {
        let rows = sqlx::query_as::<_, JournalSettingRow>(
            r#"
            SELECT setting_name, setting_value
            FROM journal_settings
            WHERE journal_id = $1
            ORDER BY setting_name
            "#,
        )
        .bind(journal_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list journal settings: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| JournalSetting {
                setting_name: row.setting_name,
                setting_value: row.setting_value,
            })
            .collect())
    }
}

fn path_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("a journal with this path already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
