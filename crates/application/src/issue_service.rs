use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use folio_core::{AppError, AppResult, JournalId, UserIdentity};
use folio_domain::RolePath;

use crate::{JournalRepository, RoleResolver, journal_service::journal_not_found};

#[cfg(test)]
mod tests;

/// Roles allowed to manage issues inside a journal.
const ISSUE_EDITOR_ROLES: [RolePath; 2] = [RolePath::Manager, RolePath::Editor];

/// Journal issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue primary key.
    pub id: i64,
    /// Owning journal.
    pub journal_id: JournalId,
    /// Volume number.
    pub volume: Option<i32>,
    /// Issue number within the volume.
    pub number: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// Optional issue title.
    pub title: Option<String>,
    /// Whether the issue is public.
    pub published: bool,
    /// Set when the issue was published.
    pub date_published: Option<DateTime<Utc>>,
}

/// Issue identification fields shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    /// Volume number.
    pub volume: Option<i32>,
    /// Issue number within the volume.
    pub number: Option<String>,
    /// Publication year.
    pub year: Option<i32>,
    /// Optional issue title.
    pub title: Option<String>,
}

/// Partial update of an issue.
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    /// Replacement identification fields, applied field by field when set.
    pub fields: IssueFields,
    /// New published flag.
    pub published: Option<bool>,
}

/// Repository port for issues.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Inserts an unpublished issue.
    async fn create_issue(&self, journal_id: JournalId, fields: IssueFields) -> AppResult<Issue>;

    /// Finds an issue by id.
    async fn find_issue(&self, issue_id: i64) -> AppResult<Option<Issue>>;

    /// Lists the issues of a journal, newest volume first.
    async fn list_issues(&self, journal_id: JournalId, published_only: bool) -> AppResult<Vec<Issue>>;

    /// Applies a partial update. `date_published` is set to `published_at` when
    /// the issue becomes published and cleared when it is unpublished.
    async fn update_issue(
        &self,
        issue_id: i64,
        changes: IssueChanges,
        published_at: DateTime<Utc>,
    ) -> AppResult<Option<Issue>>;

    /// Deletes an issue. Returns whether a row was removed.
    async fn delete_issue(&self, issue_id: i64) -> AppResult<bool>;
}

/// Application service for journal issues.
#[derive(Clone)]
pub struct IssueService {
    repository: Arc<dyn IssueRepository>,
    journal_repository: Arc<dyn JournalRepository>,
    resolver: RoleResolver,
}

impl IssueService {
    /// Creates a new service from its dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn IssueRepository>,
        journal_repository: Arc<dyn JournalRepository>,
        resolver: RoleResolver,
    ) -> Self {
        Self {
            repository,
            journal_repository,
            resolver,
        }
    }

    /// Creates an unpublished issue in a journal.
    pub async fn create_issue(
        &self,
        actor: &UserIdentity,
        journal_id: JournalId,
        fields: IssueFields,
    ) -> AppResult<Issue> {
        self.require_issue_editor(actor, journal_id).await?;
        if self
            .journal_repository
            .find_journal(journal_id)
            .await?
            .is_none()
        {
            return Err(journal_not_found(journal_id));
        }

        let issue = self
            .repository
            .create_issue(journal_id, validate_fields(fields)?)
            .await?;

        info!(actor = %actor.user_id(), %journal_id, issue_id = issue.id, "issue created");
        Ok(issue)
    }

    /// Returns one issue. Unpublished issues are visible to journal editors only.
    pub async fn get_issue(&self, actor: &UserIdentity, issue_id: i64) -> AppResult<Issue> {
        let issue = self.find_issue(issue_id).await?;
        if issue.published || self.is_issue_editor(actor, issue.journal_id).await {
            return Ok(issue);
        }

        Err(issue_not_found(issue_id))
    }

    /// Lists the issues of a journal. Non-editors see published issues only.
    pub async fn list_issues(&self, actor: &UserIdentity, journal_id: JournalId) -> AppResult<Vec<Issue>> {
        let published_only = !self.is_issue_editor(actor, journal_id).await;
        self.repository.list_issues(journal_id, published_only).await
    }

    /// Applies a partial update; publishing stamps `date_published`.
    pub async fn update_issue(
        &self,
        actor: &UserIdentity,
        issue_id: i64,
        changes: IssueChanges,
    ) -> AppResult<Issue> {
        let existing = self.find_issue(issue_id).await?;
        self.require_issue_editor(actor, existing.journal_id).await?;

        let changes = IssueChanges {
            fields: validate_fields(changes.fields)?,
            published: changes.published,
        };
        let issue = self
            .repository
            .update_issue(issue_id, changes, Utc::now())
            .await?
            .ok_or_else(|| issue_not_found(issue_id))?;

        if issue.published && !existing.published {
            info!(actor = %actor.user_id(), issue_id, "issue published");
        }
        Ok(issue)
    }

    /// Deletes an issue.
    pub async fn delete_issue(&self, actor: &UserIdentity, issue_id: i64) -> AppResult<()> {
        let existing = self.find_issue(issue_id).await?;
        self.require_issue_editor(actor, existing.journal_id).await?;

        if !self.repository.delete_issue(issue_id).await? {
            return Err(issue_not_found(issue_id));
        }

        info!(actor = %actor.user_id(), issue_id, "issue deleted");
        Ok(())
    }

    /// Returns an issue without a visibility check.
    pub(crate) async fn find_issue(&self, issue_id: i64) -> AppResult<Issue> {
        self.repository
            .find_issue(issue_id)
            .await?
            .ok_or_else(|| issue_not_found(issue_id))
    }

    async fn is_issue_editor(&self, actor: &UserIdentity, journal_id: JournalId) -> bool {
        self.resolver
            .has_site_admin_or_journal_role(actor.user_id(), journal_id, &ISSUE_EDITOR_ROLES)
            .await
    }

    async fn require_issue_editor(&self, actor: &UserIdentity, journal_id: JournalId) -> AppResult<()> {
        self.resolver
            .require_site_admin_or_journal_role(actor, journal_id, &ISSUE_EDITOR_ROLES)
            .await
    }
}

fn validate_fields(fields: IssueFields) -> AppResult<IssueFields> {
    if fields.volume.is_some_and(|volume| volume < 1) {
        return Err(AppError::Validation("volume must be positive".to_owned()));
    }
    if fields.year.is_some_and(|year| !(1000..=9999).contains(&year)) {
        return Err(AppError::Validation(
            "year must have four digits".to_owned(),
        ));
    }

    Ok(IssueFields {
        number: fields
            .number
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()),
        title: fields
            .title
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()),
        ..fields
    })
}

pub(crate) fn issue_not_found(issue_id: i64) -> AppError {
    AppError::NotFound(format!("issue {issue_id} was not found"))
}
