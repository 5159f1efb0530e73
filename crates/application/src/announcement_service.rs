use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use folio_domain::{RoleContext, RolePath};

use crate::RoleResolver;

/// Announcement posted site-wide or inside one journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Announcement primary key.
    pub id: i64,
    /// Site or journal scope.
    pub context: RoleContext,
    /// Headline.
    pub title: String,
    /// Teaser shown in listings.
    pub short_description: Option<String>,
    /// Full body.
    pub description: Option<String>,
    /// Posting timestamp.
    pub date_posted: DateTime<Utc>,
    /// Announcements past this instant are hidden from default listings.
    pub date_expire: Option<DateTime<Utc>>,
}

impl Announcement {
    /// Returns whether the announcement has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date_expire.is_some_and(|expire| expire <= now)
    }
}

/// Validated row for a new announcement.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    /// Site or journal scope.
    pub context: RoleContext,
    /// Headline.
    pub title: NonEmptyString,
    /// Teaser.
    pub short_description: Option<String>,
    /// Full body.
    pub description: Option<String>,
    /// Expiry instant.
    pub date_expire: Option<DateTime<Utc>>,
}

/// Validated partial update of an announcement.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    /// New headline.
    pub title: Option<NonEmptyString>,
    /// New teaser.
    pub short_description: Option<String>,
    /// New body.
    pub description: Option<String>,
    /// New expiry instant.
    pub date_expire: Option<DateTime<Utc>>,
}

/// Input for posting an announcement.
#[derive(Debug, Clone)]
pub struct CreateAnnouncementInput {
    /// Site or journal scope.
    pub context: RoleContext,
    /// Headline.
    pub title: String,
    /// Teaser.
    pub short_description: Option<String>,
    /// Full body.
    pub description: Option<String>,
    /// Expiry instant.
    pub date_expire: Option<DateTime<Utc>>,
}

/// Input for a partial announcement update.
#[derive(Debug, Clone, Default)]
pub struct UpdateAnnouncementInput {
    /// New headline.
    pub title: Option<String>,
    /// New teaser.
    pub short_description: Option<String>,
    /// New body.
    pub description: Option<String>,
    /// New expiry instant.
    pub date_expire: Option<DateTime<Utc>>,
}

/// Listing filter for announcements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnouncementQuery {
    /// Restricts the listing to one scope when set.
    pub context: Option<RoleContext>,
    /// Includes announcements whose expiry has passed.
    pub include_expired: bool,
}

/// Repository port for announcements.
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Inserts an announcement stamped with the current time.
    async fn create_announcement(&self, announcement: NewAnnouncement) -> AppResult<Announcement>;

    /// Finds an announcement by id.
    async fn find_announcement(&self, announcement_id: i64) -> AppResult<Option<Announcement>>;

    /// Lists announcements newest first. Expired rows are dropped unless requested.
    async fn list_announcements(
        &self,
        query: AnnouncementQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Announcement>>;

    /// Applies a partial update.
    async fn update_announcement(
        &self,
        announcement_id: i64,
        changes: AnnouncementChanges,
    ) -> AppResult<Option<Announcement>>;

    /// Deletes an announcement. Returns whether a row was removed.
    async fn delete_announcement(&self, announcement_id: i64) -> AppResult<bool>;
}

/// Application service for site and journal announcements.
#[derive(Clone)]
pub struct AnnouncementService {
    repository: Arc<dyn AnnouncementRepository>,
    resolver: RoleResolver,
}

impl AnnouncementService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn AnnouncementRepository>, resolver: RoleResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Posts an announcement in the given scope.
    pub async fn create_announcement(
        &self,
        actor: &UserIdentity,
        input: CreateAnnouncementInput,
    ) -> AppResult<Announcement> {
        self.require_manage(actor, input.context).await?;

        let announcement = self
            .repository
            .create_announcement(NewAnnouncement {
                context: input.context,
                title: NonEmptyString::new(input.title.trim())?,
                short_description: trimmed(input.short_description),
                description: trimmed(input.description),
                date_expire: input.date_expire,
            })
            .await?;

        info!(
            actor = %actor.user_id(),
            announcement_id = announcement.id,
            context = %announcement.context,
            "announcement posted"
        );
        Ok(announcement)
    }

    /// Returns one announcement.
    pub async fn get_announcement(&self, announcement_id: i64) -> AppResult<Announcement> {
        self.repository
            .find_announcement(announcement_id)
            .await?
            .ok_or_else(|| announcement_not_found(announcement_id))
    }

    /// Lists announcements for any signed-in user.
    pub async fn list_announcements(&self, query: AnnouncementQuery) -> AppResult<Vec<Announcement>> {
        self.repository.list_announcements(query, Utc::now()).await
    }

    /// Applies a partial update.
    pub async fn update_announcement(
        &self,
        actor: &UserIdentity,
        announcement_id: i64,
        input: UpdateAnnouncementInput,
    ) -> AppResult<Announcement> {
        let existing = self.get_announcement(announcement_id).await?;
        self.require_manage(actor, existing.context).await?;

        let changes = AnnouncementChanges {
            title: input
                .title
                .map(|title| NonEmptyString::new(title.trim()))
                .transpose()?,
            short_description: input.short_description.map(|value| value.trim().to_owned()),
            description: input.description.map(|value| value.trim().to_owned()),
            date_expire: input.date_expire,
        };

        self.repository
            .update_announcement(announcement_id, changes)
            .await?
            .ok_or_else(|| announcement_not_found(announcement_id))
    }

    /// Deletes an announcement.
    pub async fn delete_announcement(
        &self,
        actor: &UserIdentity,
        announcement_id: i64,
    ) -> AppResult<()> {
        let existing = self.get_announcement(announcement_id).await?;
        self.require_manage(actor, existing.context).await?;

        if !self.repository.delete_announcement(announcement_id).await? {
            return Err(announcement_not_found(announcement_id));
        }

        info!(actor = %actor.user_id(), announcement_id, "announcement deleted");
        Ok(())
    }

    async fn require_manage(&self, actor: &UserIdentity, context: RoleContext) -> AppResult<()> {
        match context {
            RoleContext::Site => self.resolver.require_site_role(actor, RolePath::Admin).await,
            RoleContext::Journal(journal_id) => {
                self.resolver
                    .require_site_admin_or_journal_role(
                        actor,
                        journal_id,
                        &[RolePath::Manager, RolePath::Editor],
                    )
                    .await
            }
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn announcement_not_found(announcement_id: i64) -> AppError {
    AppError::NotFound(format!("announcement {announcement_id} was not found"))
}
