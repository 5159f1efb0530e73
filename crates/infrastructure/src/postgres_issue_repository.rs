//! PostgreSQL-backed issue repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use folio_application::{Issue, IssueChanges, IssueFields, IssueRepository};
use folio_core::{AppError, AppResult, JournalId};


/// PostgreSQL implementation of the issue repository port.
#[derive(Clone)]
pub struct PostgresIssueRepository {
    pool: PgPool,
}

impl PostgresIssueRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IssueRow {
    issue_id: i64,
    journal_id: i64,
    volume: Option<i32>,
    number: Option<String>,
    year: Option<i32>,
    title: Option<String>,
    published: bool,
    date_published: Option<DateTime<Utc>>,
}

impl TryFrom<IssueRow> for Issue {
    type Error = AppError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.issue_id,
            journal_id: JournalId::new(row.journal_id)?,
            volume: row.volume,
            number: row.number,
            year: row.year,
            title: row.title,
            published: row.published,
            date_published: row.date_published,
        })
    }
}

const ISSUE_COLUMNS: &str =
    "issue_id, journal_id, volume, number, year, title, published, date_published";

#[async_trait]
impl IssueRepository for PostgresIssueRepository {
    async fn create_issue(&self, journal_id: JournalId, fields: IssueFields) -> AppResult<Issue> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            INSERT INTO issues (journal_id, volume, number, year, title)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(journal_id.as_i64())
        .bind(fields.volume)
        .bind(fields.number.as_deref())
        .bind(fields.year)
        .bind(fields.title.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create issue: {error}")))?;

        Issue::try_from(row)
    }

    async fn find_issue(&self, issue_id: i64) -> AppResult<Option<Issue>> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE issue_id = $1"
        ))
        .bind(issue_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find issue: {error}")))?;

        row.map(Issue::try_from).transpose()
    }

    async fn list_issues(&self, journal_id: JournalId, published_only: bool) -> AppResult<Vec<Issue>> {
        let rows = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            SELECT {ISSUE_COLUMNS}
            FROM issues
            WHERE journal_id = $1
              AND (published OR NOT $2)
            ORDER BY volume DESC NULLS LAST, number DESC NULLS LAST, issue_id DESC
            "#
        ))
        .bind(journal_id.as_i64())
        .bind(published_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list issues: {error}")))?;

        rows.into_iter().map(Issue::try_from).collect()
    }

    async fn update_issue(
        &self,
        issue_id: i64,
        changes: IssueChanges,
        published_at: DateTime<Utc>,
    ) -> AppResult<Option<Issue>> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            UPDATE issues
            SET volume = COALESCE($2, volume),
                number = COALESCE($3, number),
                year = COALESCE($4, year),
                title = COALESCE($5, title),
                date_published = CASE
                    WHEN $6 IS TRUE AND NOT published THEN $7
                    WHEN $6 IS FALSE THEN NULL
                    ELSE date_published
                END,
                published = COALESCE($6, published)
            WHERE issue_id = $1
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(issue_id)
        .bind(changes.fields.volume)
        .bind(changes.fields.number.as_deref())
        .bind(changes.fields.year)
        .bind(changes.fields.title.as_deref())
        .bind(changes.published)
        .bind(published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update issue: {error}")))?;

        row.map(Issue::try_from).transpose()
    }

    async fn delete_issue(&self, issue_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM issues WHERE issue_id = $1")
            .bind(issue_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete issue: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
