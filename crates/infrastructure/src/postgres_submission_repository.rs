//! PostgreSQL-backed submission repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use folio_application::{
    NewPublication, NewSubmission, Publication, Submission, SubmissionChanges,
    SubmissionRepository, SubmissionWithPublications,
};
use folio_core::{AppError, AppResult, JournalId, UserId};
use folio_domain::{PublicationStatus, SubmissionStatus, WorkflowStage};


/// PostgreSQL implementation of the submission repository port.
#[derive(Clone)]
pub struct PostgresSubmissionRepository {
    pool: PgPool,
}

impl PostgresSubmissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    submission_id: i64,
    journal_id: i64,
    submitter_id: uuid::Uuid,
    title: String,
    abstract_text: Option<String>,
    status: String,
    stage: String,
    date_submitted: DateTime<Utc>,
    current_publication_id: Option<i64>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.submission_id,
            journal_id: JournalId::new(row.journal_id)?,
            submitter_id: UserId::from_uuid(row.submitter_id),
            title: row.title,
            abstract_text: row.abstract_text,
            status: SubmissionStatus::from_str(row.status.as_str())?,
            stage: WorkflowStage::from_str(row.stage.as_str())?,
            date_submitted: row.date_submitted,
            current_publication_id: row.current_publication_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct PublicationRow {
    publication_id: i64,
    submission_id: i64,
    version: i32,
    title: String,
    status: String,
    issue_id: Option<i64>,
    date_published: Option<DateTime<Utc>>,
}

impl TryFrom<PublicationRow> for Publication {
    type Error = AppError;

    fn try_from(row: PublicationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.publication_id,
            submission_id: row.submission_id,
            version: row.version,
            title: row.title,
            status: PublicationStatus::from_str(row.status.as_str())?,
            issue_id: row.issue_id,
            date_published: row.date_published,
        })
    }
}

/// One row of the submission/publication left join.
#[derive(Debug, FromRow)]
struct SubmissionPublicationRow {
    #[sqlx(flatten)]
    submission: SubmissionRow,
    publication_id: Option<i64>,
    version: Option<i32>,
    publication_title: Option<String>,
    publication_status: Option<String>,
    issue_id: Option<i64>,
    date_published: Option<DateTime<Utc>>,
}

impl SubmissionPublicationRow {
    fn publication(&self) -> AppResult<Option<Publication>> {
        let (Some(publication_id), Some(version), Some(title), Some(status)) = (
            self.publication_id,
            self.version,
            self.publication_title.as_ref(),
            self.publication_status.as_ref(),
        ) else {
            return Ok(None);
        };

        Ok(Some(Publication {
            id: publication_id,
            submission_id: self.submission.submission_id,
            version,
            title: title.clone(),
            status: PublicationStatus::from_str(status.as_str())?,
            issue_id: self.issue_id,
            date_published: self.date_published,
        }))
    }
}

const SUBMISSION_COLUMNS: &str = "submission_id, journal_id, submitter_id, title, abstract_text, \
     status, stage, date_submitted, current_publication_id";

const PUBLICATION_COLUMNS: &str =
    "publication_id, submission_id, version, title, status, issue_id, date_published";

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            INSERT INTO submissions (journal_id, submitter_id, title, abstract_text)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(submission.journal_id.as_i64())
        .bind(submission.submitter_id.as_uuid())
        .bind(submission.title.as_str())
        .bind(submission.abstract_text.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create submission: {error}")))?;

        Submission::try_from(row)
    }

    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> AppResult<Option<SubmissionWithPublications>> {
        let rows = sqlx::query_as::<_, SubmissionPublicationRow>(
            r#"
            SELECT
                s.submission_id,
                s.journal_id,
                s.submitter_id,
                s.title,
                s.abstract_text,
                s.status,
                s.stage,
                s.date_submitted,
                s.current_publication_id,
                p.publication_id,
                p.version,
                p.title AS publication_title,
                p.status AS publication_status,
                p.issue_id,
                p.date_published
            FROM submissions s
            LEFT JOIN publications p ON p.submission_id = s.submission_id
            WHERE s.submission_id = $1
            ORDER BY p.version NULLS FIRST
            "#,
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find submission: {error}")))?;

        let mut publications = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(publication) = row.publication()? {
                publications.push(publication);
            }
        }

        let Some(first) = rows.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(SubmissionWithPublications {
            submission: Submission::try_from(first.submission)?,
            publications,
        }))
    }

    async fn list_journal_submissions(&self, journal_id: JournalId) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE journal_id = $1
            ORDER BY date_submitted DESC, submission_id DESC
            "#
        ))
        .bind(journal_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list journal submissions: {error}"))
        })?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn list_submitter_submissions(&self, submitter_id: UserId) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE submitter_id = $1
            ORDER BY date_submitted DESC, submission_id DESC
            "#
        ))
        .bind(submitter_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list submitter submissions: {error}"))
        })?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn update_submission(
        &self,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> AppResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            UPDATE submissions
            SET status = COALESCE($2, status),
                stage = COALESCE($3, stage),
                updated_at = now()
            WHERE submission_id = $1
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(submission_id)
        .bind(changes.status.map(|status| status.as_str()))
        .bind(changes.stage.map(|stage| stage.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update submission: {error}")))?;

        row.map(Submission::try_from).transpose()
    }

    async fn create_publication(&self, publication: NewPublication) -> AppResult<Publication> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start publication transaction: {error}"))
        })?;

        // Lock the submission so concurrent versions are numbered sequentially.
        let locked = sqlx::query_scalar::<_, i64>(
            "SELECT submission_id FROM submissions WHERE submission_id = $1 FOR UPDATE",
        )
        .bind(publication.submission_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock submission: {error}")))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "submission {} was not found",
                publication.submission_id
            )));
        }

        let row = sqlx::query_as::<_, PublicationRow>(&format!(
            r#"
            INSERT INTO publications (submission_id, version, title, status, issue_id, date_published)
            SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3, $4, $5
            FROM publications
            WHERE submission_id = $1
            RETURNING {PUBLICATION_COLUMNS}
            "#
        ))
        .bind(publication.submission_id)
        .bind(publication.title.as_str())
        .bind(publication.status.as_str())
        .bind(publication.issue_id)
        .bind(publication.date_published)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create publication: {error}")))?;

        sqlx::query(
            r#"
            UPDATE submissions
            SET current_publication_id = $2, updated_at = now()
            WHERE submission_id = $1
            "#,
        )
        .bind(publication.submission_id)
        .bind(row.publication_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to set current publication: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit publication: {error}"))
        })?;

        Publication::try_from(row)
    }

    async fn delete_submission(&self, submission_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM submissions WHERE submission_id = $1")
            .bind(submission_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete submission: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
