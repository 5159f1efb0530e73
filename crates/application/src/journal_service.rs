use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, JournalId, NonEmptyString, UserIdentity};
use folio_domain::{JournalPath, RolePath};

use crate::RoleResolver;

/// Journal row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    /// Journal primary key; also the role context id.
    pub id: JournalId,
    /// Unique URL path.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Disabled journals are hidden from non-administrators.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One `journal_settings` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSetting {
    /// Setting key.
    pub setting_name: String,
    /// Setting value.
    pub setting_value: String,
}

/// Validated row for a new journal.
#[derive(Debug, Clone)]
pub struct NewJournal {
    /// Unique URL path.
    pub path: JournalPath,
    /// Display name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Initial enabled flag.
    pub enabled: bool,
}

/// Validated partial update of a journal.
#[derive(Debug, Clone, Default)]
pub struct JournalChanges {
    /// New URL path.
    pub path: Option<JournalPath>,
    /// New display name.
    pub name: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
    /// New enabled flag.
    pub enabled: Option<bool>,
}

/// Input for creating a journal.
#[derive(Debug, Clone)]
pub struct CreateJournalInput {
    /// URL path.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial enabled flag.
    pub enabled: bool,
}

/// Input for a partial journal update.
#[derive(Debug, Clone, Default)]
pub struct UpdateJournalInput {
    /// New URL path.
    pub path: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New enabled flag.
    pub enabled: Option<bool>,
}

/// Repository port for journals.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// Creates a journal with its seed settings and default user groups in one step.
    async fn create_journal(&self, journal: NewJournal) -> AppResult<Journal>;

    /// Finds a journal by id.
    async fn find_journal(&self, journal_id: JournalId) -> AppResult<Option<Journal>>;

    /// Finds a journal by URL path.
    async fn find_journal_by_path(&self, path: &str) -> AppResult<Option<Journal>>;

    /// Lists journals ordered by path.
    async fn list_journals(&self, include_disabled: bool) -> AppResult<Vec<Journal>>;

    /// Applies a partial update.
    async fn update_journal(
        &self,
        journal_id: JournalId,
        changes: JournalChanges,
    ) -> AppResult<Option<Journal>>;

    /// Deletes a journal and everything scoped to it. Returns whether a row was removed.
    async fn delete_journal(&self, journal_id: JournalId) -> AppResult<bool>;

    /// Lists the settings of a journal ordered by name.
    async fn list_journal_settings(&self, journal_id: JournalId) -> AppResult<Vec<JournalSetting>>;
}

/// Application service for journal administration.
#[derive(Clone)]
pub struct JournalService {
    repository: Arc<dyn JournalRepository>,
    resolver: RoleResolver,
}

impl JournalService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn JournalRepository>, resolver: RoleResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Creates a journal. Site administrators only.
    pub async fn create_journal(
        &self,
        actor: &UserIdentity,
        input: CreateJournalInput,
    ) -> AppResult<Journal> {
        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await?;

        let journal = self
            .repository
            .create_journal(NewJournal {
                path: JournalPath::new(input.path)?,
                name: NonEmptyString::new(input.name.trim())?,
                description: normalize_description(input.description),
                enabled: input.enabled,
            })
            .await?;

        info!(actor = %actor.user_id(), journal_id = %journal.id, path = journal.path, "journal created");
        Ok(journal)
    }

    /// Returns a journal. Disabled journals are visible to administrators and their managers only.
    pub async fn get_journal(&self, actor: &UserIdentity, journal_id: JournalId) -> AppResult<Journal> {
        let journal = self
            .repository
            .find_journal(journal_id)
            .await?
            .ok_or_else(|| journal_not_found(journal_id))?;

        self.ensure_visible(actor, journal).await
    }

    /// Returns a journal by its URL path.
    pub async fn get_journal_by_path(&self, actor: &UserIdentity, path: &str) -> AppResult<Journal> {
        let journal = self
            .repository
            .find_journal_by_path(path.trim().to_lowercase().as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("journal '{path}' was not found")))?;

        self.ensure_visible(actor, journal).await
    }

    /// Lists journals. Non-administrators see enabled journals only.
    pub async fn list_journals(&self, actor: &UserIdentity) -> AppResult<Vec<Journal>> {
        let include_disabled = self.resolver.is_site_admin(actor.user_id()).await;
        self.repository.list_journals(include_disabled).await
    }

    /// Applies a partial update. Site administrators or journal managers.
    pub async fn update_journal(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
        input: UpdateJournalInput,
    ) -> AppResult<Journal> {
        self.resolver
            .require_site_admin_or_journal_role(actor, journal_id, &[RolePath::Manager])
            .await?;

        let changes = JournalChanges {
            path: input.path.map(JournalPath::new).transpose()?,
            name: input
                .name
                .map(|name| NonEmptyString::new(name.trim()))
                .transpose()?,
            description: input.description.map(|value| value.trim().to_owned()),
            enabled: input.enabled,
        };

        let journal = self
            .repository
            .update_journal(journal_id, changes)
            .await?
            .ok_or_else(|| journal_not_found(journal_id))?;

        info!(actor = %actor.user_id(), %journal_id, enabled = journal.enabled, "journal updated");
        Ok(journal)
    }

    /// Deletes a journal. Site administrators only.
    pub async fn delete_journal(&self, actor: &UserIdentity, journal_id: JournalId) -> AppResult<()> {
        self.resolver
            .require_site_role(actor, RolePath::Admin)
            .await?;

        if !self.repository.delete_journal(journal_id).await? {
            return Err(journal_not_found(journal_id));
        }

        info!(actor = %actor.user_id(), %journal_id, "journal deleted");
        Ok(())
    }

    /// Lists journal settings. Site administrators or journal managers.
    pub async fn list_journal_settings(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
    ) -> AppResult<Vec<JournalSetting>> {
        self.resolver
            .require_site_admin_or_journal_role(actor, journal_id, &[RolePath::Manager])
            .await?;

        if self.repository.find_journal(journal_id).await?.is_none() {
            return Err(journal_not_found(journal_id));
        }

        self.repository.list_journal_settings(journal_id).await
    }

    async fn ensure_visible(&self, actor: &UserIdentity, journal: Journal) -> AppResult<Journal> {
        if journal.enabled
            || self
                .resolver
                .has_site_admin_or_journal_role(actor.user_id(), journal.id, &[RolePath::Manager])
                .await
        {
            return Ok(journal);
        }

        Err(journal_not_found(journal.id))
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

pub(crate) fn journal_not_found(journal_id: JournalId) -> AppError {
    AppError::NotFound(format!("journal {journal_id} was not found"))
}
