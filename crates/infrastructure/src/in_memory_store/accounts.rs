use async_trait::async_trait;
use chrono::Utc;

use folio_application::{
    Journal, JournalChanges, JournalRepository, JournalSetting, NewJournal, NewUserRecord,
    UserAccount, UserCredentials, UserGroup, UserRepository,
};
use folio_core::{AppError, AppResult, JournalId, UserId};
use folio_domain::{DEFAULT_JOURNAL_SETTINGS, RoleContext, RolePath};

use super::{InMemoryStore, StoredUser};

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, record: NewUserRecord) -> AppResult<UserAccount> {
        let mut state = self.state.write().await;
        let email = record.email.as_str().to_lowercase();
        if state
            .users
            .values()
            .any(|stored| stored.account.email == email)
        {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let account = UserAccount {
            id: UserId::new(),
            email,
            display_name: record.display_name.into(),
            created_at: Utc::now(),
        };
        state.users.insert(
            account.id,
            StoredUser {
                account: account.clone(),
                password_hash: record.password_hash,
            },
        );

        Ok(account)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        let state = self.state.read().await;
        Ok(state.users.get(&user_id).map(|stored| stored.account.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let email = email.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|stored| stored.account.email == email)
            .map(|stored| UserCredentials {
                account: stored.account.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        let state = self.state.read().await;
        let mut accounts: Vec<UserAccount> = state
            .users
            .values()
            .map(|stored| stored.account.clone())
            .collect();
        accounts.sort_by(|left, right| left.email.cmp(&right.email));

        Ok(accounts)
    }

    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: &str,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&user_id).map(|stored| {
            stored.account.display_name = display_name.to_owned();
            stored.account.clone()
        }))
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        state.grants.retain(|grant| grant.user_id != user_id);
        state.memberships.retain(|(_, member)| *member != user_id);
        state
            .assignments
            .retain(|_, assignment| assignment.reviewer_id != user_id);
        let owned: Vec<i64> = state
            .submissions
            .values()
            .filter(|submission| submission.submitter_id == user_id)
            .map(|submission| submission.id)
            .collect();
        for submission_id in owned {
            state.remove_submission_rows(submission_id);
        }

        Ok(true)
    }
}

#[async_trait]
impl JournalRepository for InMemoryStore {
    async fn create_journal(&self, journal: NewJournal) -> AppResult<Journal> {
        let mut state = self.state.write().await;
        if state
            .journals
            .values()
            .any(|existing| existing.path == journal.path.as_str())
        {
            return Err(AppError::Conflict(
                "a journal with this path already exists".to_owned(),
            ));
        }

        let journal_id = JournalId::new(state.next_id())?;
        let now = Utc::now();
        let created = Journal {
            id: journal_id,
            path: journal.path.into(),
            name: journal.name.into(),
            description: journal.description,
            enabled: journal.enabled,
            created_at: now,
            updated_at: now,
        };

        let mut settings = vec![
            ("name".to_owned(), created.name.clone()),
            (
                "description".to_owned(),
                created.description.clone().unwrap_or_default(),
            ),
        ];
        settings.extend(
            DEFAULT_JOURNAL_SETTINGS
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned())),
        );
        for (name, value) in settings {
            state.journal_settings.insert((journal_id, name), value);
        }

        for role in RolePath::journal_defaults() {
            let user_group_id = state.next_id();
            state.groups.insert(
                user_group_id,
                UserGroup {
                    user_group_id,
                    role_id: role.legacy_role_id(),
                    context: RoleContext::Journal(journal_id),
                    is_default: true,
                },
            );
        }

        state.journals.insert(journal_id, created.clone());
        Ok(created)
    }

    async fn find_journal(&self, journal_id: JournalId) -> AppResult<Option<Journal>> {
        Ok(self.state.read().await.journals.get(&journal_id).cloned())
    }

    async fn find_journal_by_path(&self, path: &str) -> AppResult<Option<Journal>> {
        let state = self.state.read().await;
        Ok(state
            .journals
            .values()
            .find(|journal| journal.path == path)
            .cloned())
    }

    async fn list_journals(&self, include_disabled: bool) -> AppResult<Vec<Journal>> {
        let state = self.state.read().await;
        let mut journals: Vec<Journal> = state
            .journals
            .values()
            .filter(|journal| include_disabled || journal.enabled)
            .cloned()
            .collect();
        journals.sort_by(|left, right| left.path.cmp(&right.path));

        Ok(journals)
    }

    async fn update_journal(
        &self,
        journal_id: JournalId,
        changes: JournalChanges,
    ) -> AppResult<Option<Journal>> {
        let mut state = self.state.write().await;
        if let Some(path) = changes.path.as_ref()
            && state
                .journals
                .values()
                .any(|existing| existing.id != journal_id && existing.path == path.as_str())
        {
            return Err(AppError::Conflict(
                "a journal with this path already exists".to_owned(),
            ));
        }

        let Some(journal) = state.journals.get_mut(&journal_id) else {
            return Ok(None);
        };

        if let Some(path) = changes.path {
            journal.path = path.into();
        }
        if let Some(name) = changes.name {
            journal.name = name.into();
        }
        if let Some(description) = changes.description {
            journal.description = Some(description).filter(|value| !value.is_empty());
        }
        if let Some(enabled) = changes.enabled {
            journal.enabled = enabled;
        }
        journal.updated_at = Utc::now();

        let updated = journal.clone();
        state
            .journal_settings
            .insert((journal_id, "name".to_owned()), updated.name.clone());
        state.journal_settings.insert(
            (journal_id, "description".to_owned()),
            updated.description.clone().unwrap_or_default(),
        );

        Ok(Some(updated))
    }

    async fn delete_journal(&self, journal_id: JournalId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.journals.remove(&journal_id).is_none() {
            return Ok(false);
        }

        let context = RoleContext::Journal(journal_id);
        state
            .journal_settings
            .retain(|(owner, _), _| *owner != journal_id);
        state.grants.retain(|grant| grant.context != context);

        let removed_groups: Vec<i64> = state
            .groups
            .values()
            .filter(|group| group.context == context)
            .map(|group| group.user_group_id)
            .collect();
        state
            .groups
            .retain(|_, group| group.context != context);
        state
            .memberships
            .retain(|(group_id, _)| !removed_groups.contains(group_id));

        state
            .announcements
            .retain(|_, announcement| announcement.context != context);
        state.issues.retain(|_, issue| issue.journal_id != journal_id);
        let submissions: Vec<i64> = state
            .submissions
            .values()
            .filter(|submission| submission.journal_id == journal_id)
            .map(|submission| submission.id)
            .collect();
        for submission_id in submissions {
            state.remove_submission_rows(submission_id);
        }

        Ok(true)
    }

    async fn list_journal_settings(&self, journal_id: JournalId) -> AppResult<Vec<JournalSetting>> {
        let state = self.state.read().await;
        Ok(state
            .journal_settings
            .iter()
            .filter(|((owner, _), _)| *owner == journal_id)
            .map(|((_, name), value)| JournalSetting {
                setting_name: name.clone(),
                setting_value: value.clone(),
            })
            .collect())
    }
}
