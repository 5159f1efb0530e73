//! PostgreSQL-backed announcement repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use folio_application::{
    Announcement, AnnouncementChanges, AnnouncementQuery, AnnouncementRepository, NewAnnouncement,
};
use folio_core::{AppError, AppResult};
use folio_domain::RoleContext;

/// PostgreSQL implementation of the announcement repository port.
#[derive(Clone)]
pub struct PostgresAnnouncementRepository {
    pool: PgPool,
}

impl PostgresAnnouncementRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AnnouncementRow {
    announcement_id: i64,
    journal_id: Option<i64>,
    title: String,
    short_description: Option<String>,
    description: Option<String>,
    date_posted: DateTime<Utc>,
    date_expire: Option<DateTime<Utc>>,
}

impl TryFrom<AnnouncementRow> for Announcement {
    type Error = AppError;

    fn try_from(row: AnnouncementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.announcement_id,
            context: RoleContext::from_flat(row.journal_id)?,
            title: row.title,
            short_description: row.short_description,
            description: row.description,
            date_posted: row.date_posted,
            date_expire: row.date_expire,
        })
    }
}

const ANNOUNCEMENT_COLUMNS: &str =
    "announcement_id, journal_id, title, short_description, description, date_posted, date_expire";

#[async_trait]
impl AnnouncementRepository for PostgresAnnouncementRepository {
    async fn create_announcement(&self, announcement: NewAnnouncement) -> AppResult<Announcement> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            INSERT INTO announcements (journal_id, title, short_description, description, date_expire)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(announcement.context.flat_context_id())
        .bind(announcement.title.as_str())
        .bind(announcement.short_description.as_deref())
        .bind(announcement.description.as_deref())
        .bind(announcement.date_expire)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::Validation(format!(
                    "journal for announcement does not exist: {}",
                    announcement.context
                ));
            }

            AppError::Internal(format!("failed to create announcement: {error}"))
        })?;

        Announcement::try_from(row)
    }

    async fn find_announcement(&self, announcement_id: i64) -> AppResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE announcement_id = $1"
        ))
        .bind(announcement_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find announcement: {error}")))?;

        row.map(Announcement::try_from).transpose()
    }

    async fn list_announcements(
        &self,
        query: AnnouncementQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            SELECT {ANNOUNCEMENT_COLUMNS}
            FROM announcements
            WHERE ($1 = FALSE OR journal_id IS NOT DISTINCT FROM $2)
              AND ($3 OR date_expire IS NULL OR date_expire > $4)
            ORDER BY date_posted DESC, announcement_id DESC
            "#
        ))
        .bind(query.context.is_some())
        .bind(query.context.and_then(|context| context.flat_context_id()))
        .bind(query.include_expired)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list announcements: {error}")))?;

        rows.into_iter().map(Announcement::try_from).collect()
    }

    async fn update_announcement(
        &self,
        announcement_id: i64,
        changes: AnnouncementChanges,
    ) -> AppResult<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r#"
            UPDATE announcements
            SET title = COALESCE($2, title),
                short_description = CASE WHEN $3 THEN NULLIF($4, '') ELSE short_description END,
                description = CASE WHEN $5 THEN NULLIF($6, '') ELSE description END,
                date_expire = COALESCE($7, date_expire)
            WHERE announcement_id = $1
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(announcement_id)
        .bind(changes.title.as_ref().map(|title| title.as_str()))
        .bind(changes.short_description.is_some())
        .bind(changes.short_description.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.as_deref())
        .bind(changes.date_expire)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update announcement: {error}")))?;

        row.map(Announcement::try_from).transpose()
    }

    async fn delete_announcement(&self, announcement_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE announcement_id = $1")
            .bind(announcement_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete announcement: {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
