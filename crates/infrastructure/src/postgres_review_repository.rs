//! PostgreSQL-backed review assignment repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use folio_application::{NewReviewAssignment, ReviewAssignment, ReviewRepository, ReviewTransition};
use folio_core::{AppError, AppResult, UserId};
use folio_domain::{ReviewRecommendation, ReviewStatus};

/// PostgreSQL implementation of the review assignment repository port.
#[derive(Clone)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReviewAssignmentRow {
    review_id: i64,
    submission_id: i64,
    reviewer_id: uuid::Uuid,
    status: String,
    recommendation: Option<String>,
    date_assigned: DateTime<Utc>,
    date_due: Option<DateTime<Utc>>,
    date_completed: Option<DateTime<Utc>>,
}

impl TryFrom<ReviewAssignmentRow> for ReviewAssignment {
    type Error = AppError;

    fn try_from(row: ReviewAssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.review_id,
            submission_id: row.submission_id,
            reviewer_id: UserId::from_uuid(row.reviewer_id),
            status: ReviewStatus::from_str(row.status.as_str())?,
            recommendation: row
                .recommendation
                .as_deref()
                .map(ReviewRecommendation::from_str)
                .transpose()?,
            date_assigned: row.date_assigned,
            date_due: row.date_due,
            date_completed: row.date_completed,
        })
    }
}

const REVIEW_COLUMNS: &str = "review_id, submission_id, reviewer_id, status, recommendation, \
     date_assigned, date_due, date_completed";

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn create_assignment(&self, assignment: NewReviewAssignment) -> AppResult<ReviewAssignment> {
        let row = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            r#"
            INSERT INTO review_assignments (submission_id, reviewer_id, date_due)
            VALUES ($1, $2, $3)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(assignment.submission_id)
        .bind(assignment.reviewer_id.as_uuid())
        .bind(assignment.date_due)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "reviewer '{}' is already assigned to submission {}",
                    assignment.reviewer_id, assignment.submission_id
                ));
            }

            AppError::Internal(format!("failed to create review assignment: {error}"))
        })?;

        ReviewAssignment::try_from(row)
    }

    async fn find_assignment(&self, assignment_id: i64) -> AppResult<Option<ReviewAssignment>> {
        let row = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review_assignments WHERE review_id = $1"
        ))
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find review assignment: {error}"))
        })?;

        row.map(ReviewAssignment::try_from).transpose()
    }

    async fn find_assignment_for_reviewer(
        &self,
        submission_id: i64,
        reviewer_id: UserId,
    ) -> AppResult<Option<ReviewAssignment>> {
        let row = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM review_assignments
            WHERE submission_id = $1 AND reviewer_id = $2
            "#
        ))
        .bind(submission_id)
        .bind(reviewer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find reviewer assignment: {error}"))
        })?;

        row.map(ReviewAssignment::try_from).transpose()
    }

    async fn list_submission_assignments(&self, submission_id: i64) -> AppResult<Vec<ReviewAssignment>> {
        let rows = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM review_assignments
            WHERE submission_id = $1
            ORDER BY date_assigned, review_id
            "#
        ))
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list submission reviews: {error}"))
        })?;

        rows.into_iter().map(ReviewAssignment::try_from).collect()
    }

    async fn list_reviewer_assignments(&self, reviewer_id: UserId) -> AppResult<Vec<ReviewAssignment>> {
        let rows = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM review_assignments
            WHERE reviewer_id = $1
            ORDER BY date_assigned DESC, review_id DESC
            "#
        ))
        .bind(reviewer_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list reviewer reviews: {error}")))?;

        rows.into_iter().map(ReviewAssignment::try_from).collect()
    }

    async fn transition_assignment(
        &self,
        assignment_id: i64,
        transition: ReviewTransition,
    ) -> AppResult<Option<ReviewAssignment>> {
        let row = sqlx::query_as::<_, ReviewAssignmentRow>(&format!(
            r#"
            UPDATE review_assignments
            SET status = $2,
                recommendation = COALESCE($3, recommendation),
                date_completed = COALESCE($4, date_completed)
            WHERE review_id = $1
              AND status = $5
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(assignment_id)
        .bind(transition.status.as_str())
        .bind(transition.recommendation.map(|recommendation| recommendation.as_str()))
        .bind(transition.date_completed)
        .bind(transition.from.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update review assignment: {error}"))
        })?;

        row.map(ReviewAssignment::try_from).transpose()
    }

    async fn delete_assignment(&self, assignment_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM review_assignments WHERE review_id = $1")
            .bind(assignment_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete review assignment: {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
