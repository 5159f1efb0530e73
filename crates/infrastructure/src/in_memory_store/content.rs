use async_trait::async_trait;
use chrono::{DateTime, Utc};

use folio_application::{
    Announcement, AnnouncementChanges, AnnouncementQuery, AnnouncementRepository, Issue,
    IssueChanges, IssueFields, IssueRepository, NewAnnouncement,
};
use folio_core::{AppError, AppResult, JournalId};

use super::InMemoryStore;

#[async_trait]
impl AnnouncementRepository for InMemoryStore {
    async fn create_announcement(&self, announcement: NewAnnouncement) -> AppResult<Announcement> {
        let mut state = self.state.write().await;
        if let Some(journal_id) = announcement.context.journal_id()
            && !state.journals.contains_key(&journal_id)
        {
            return Err(AppError::Validation(format!(
                "journal for announcement does not exist: {}",
                announcement.context
            )));
        }

        let created = Announcement {
            id: state.next_id(),
            context: announcement.context,
            title: announcement.title.into(),
            short_description: announcement.short_description,
            description: announcement.description,
            date_posted: Utc::now(),
            date_expire: announcement.date_expire,
        };
        state.announcements.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_announcement(&self, announcement_id: i64) -> AppResult<Option<Announcement>> {
        Ok(self
            .state
            .read()
            .await
            .announcements
            .get(&announcement_id)
            .cloned())
    }

    async fn list_announcements(
        &self,
        query: AnnouncementQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Announcement>> {
        let state = self.state.read().await;
        let mut announcements: Vec<Announcement> = state
            .announcements
            .values()
            .filter(|announcement| {
                query
                    .context
                    .is_none_or(|context| announcement.context == context)
            })
            .filter(|announcement| query.include_expired || !announcement.is_expired(now))
            .cloned()
            .collect();
        announcements.sort_by(|left, right| {
            right
                .date_posted
                .cmp(&left.date_posted)
                .then(right.id.cmp(&left.id))
        });

        Ok(announcements)
    }

    async fn update_announcement(
        &self,
        announcement_id: i64,
        changes: AnnouncementChanges,
    ) -> AppResult<Option<Announcement>> {
        let mut state = self.state.write().await;
        Ok(state
            .announcements
            .get_mut(&announcement_id)
            .map(|announcement| {
                if let Some(title) = changes.title {
                    announcement.title = title.into();
                }
                if let Some(short_description) = changes.short_description {
                    announcement.short_description =
                        Some(short_description).filter(|value| !value.is_empty());
                }
                if let Some(description) = changes.description {
                    announcement.description = Some(description).filter(|value| !value.is_empty());
                }
                if let Some(date_expire) = changes.date_expire {
                    announcement.date_expire = Some(date_expire);
                }
                announcement.clone()
            }))
    }

    async fn delete_announcement(&self, announcement_id: i64) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .announcements
            .remove(&announcement_id)
            .is_some())
    }
}

#[async_trait]
impl IssueRepository for InMemoryStore {
    async fn create_issue(&self, journal_id: JournalId, fields: IssueFields) -> AppResult<Issue> {
        let mut state = self.state.write().await;
        let issue = Issue {
            id: state.next_id(),
            journal_id,
            volume: fields.volume,
            number: fields.number,
            year: fields.year,
            title: fields.title,
            published: false,
            date_published: None,
        };
        state.issues.insert(issue.id, issue.clone());

        Ok(issue)
    }

    async fn find_issue(&self, issue_id: i64) -> AppResult<Option<Issue>> {
        Ok(self.state.read().await.issues.get(&issue_id).cloned())
    }

    async fn list_issues(&self, journal_id: JournalId, published_only: bool) -> AppResult<Vec<Issue>> {
        let state = self.state.read().await;
        let mut issues: Vec<Issue> = state
            .issues
            .values()
            .filter(|issue| issue.journal_id == journal_id)
            .filter(|issue| issue.published || !published_only)
            .cloned()
            .collect();
        issues.sort_by(|left, right| {
            right
                .volume
                .cmp(&left.volume)
                .then_with(|| right.number.cmp(&left.number))
                .then(right.id.cmp(&left.id))
        });

        Ok(issues)
    }

    async fn update_issue(
        &self,
        issue_id: i64,
        changes: IssueChanges,
        published_at: DateTime<Utc>,
    ) -> AppResult<Option<Issue>> {
        let mut state = self.state.write().await;
        Ok(state.issues.get_mut(&issue_id).map(|issue| {
            let IssueFields {
                volume,
                number,
                year,
                title,
            } = changes.fields;
            issue.volume = volume.or(issue.volume);
            issue.number = number.or(issue.number.take());
            issue.year = year.or(issue.year);
            issue.title = title.or(issue.title.take());

            match changes.published {
                Some(true) if !issue.published => {
                    issue.published = true;
                    issue.date_published = Some(published_at);
                }
                Some(false) => {
                    issue.published = false;
                    issue.date_published = None;
                }
                _ => {}
            }
            issue.clone()
        }))
    }

    async fn delete_issue(&self, issue_id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.issues.remove(&issue_id).is_none() {
            return Ok(false);
        }

        for publication in state.publications.values_mut() {
            if publication.issue_id == Some(issue_id) {
                publication.issue_id = None;
            }
        }
        Ok(true)
    }
}
