use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use folio_core::{AppError, AppResult, JournalId, UserId, UserIdentity};
use folio_domain::{LegacyRoleId, ReviewStatus, RoleContext, SubmissionStatus, WorkflowStage};

use crate::{
    Issue, IssueChanges, IssueFields, IssueRepository, Journal, JournalChanges,
    JournalRepository, JournalSetting, NewJournal, NewPublication, NewReviewAssignment,
    NewSubmission, NewUserRecord, Publication, ReviewAssignment, ReviewRepository,
    ReviewTransition, RoleGrant, RoleGrantRepository, Submission, SubmissionChanges,
    SubmissionRepository, SubmissionWithPublications, UserAccount, UserCredentials, UserGroup,
    UserGroupMembership, UserGroupRepository, UserRepository,
};

pub(crate) fn identity(user_id: UserId) -> UserIdentity {
    UserIdentity::new(user_id, "Tester", format!("{user_id}@journal.test"))
}

pub(crate) fn journal_id(value: i64) -> JournalId {
    JournalId::new(value).unwrap_or_else(|error| panic!("invalid journal id in test: {error}"))
}

/// Both role stores with switchable failures.
#[derive(Default)]
pub(crate) struct FakeRoleStore {
    pub(crate) grants: Mutex<Vec<RoleGrant>>,
    pub(crate) groups: Mutex<Vec<UserGroup>>,
    pub(crate) memberships: Mutex<Vec<(i64, UserId)>>,
    pub(crate) fail_grants: AtomicBool,
    pub(crate) fail_groups: AtomicBool,
    next_group_id: AtomicI64,
}

impl FakeRoleStore {
    pub(crate) async fn seed_grant(&self, user_id: UserId, role_name: &str, context: RoleContext) {
        self.grants.lock().await.push(RoleGrant {
            user_id,
            role_name: role_name.to_owned(),
            context,
        });
    }

    pub(crate) async fn has_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> bool {
        self.grants.lock().await.iter().any(|grant| {
            grant.user_id == user_id && grant.role_name == role_name && grant.context == context
        })
    }

    pub(crate) async fn seed_membership(
        &self,
        user_id: UserId,
        role_id: LegacyRoleId,
        context: RoleContext,
    ) {
        let user_group_id = self.next_group_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.groups.lock().await.push(UserGroup {
            user_group_id,
            role_id,
            context,
            is_default: false,
        });
        self.memberships.lock().await.push((user_group_id, user_id));
    }

    pub(crate) async fn membership_count(
        &self,
        user_id: UserId,
        role_id: LegacyRoleId,
        context: RoleContext,
    ) -> usize {
        let groups = self.groups.lock().await;
        let memberships = self.memberships.lock().await;
        memberships
            .iter()
            .filter(|(group_id, member)| {
                *member == user_id
                    && groups.iter().any(|group| {
                        group.user_group_id == *group_id
                            && group.role_id == role_id
                            && group.context == context
                    })
            })
            .count()
    }

    fn check(&self, flag: &AtomicBool, store: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!("{store} is unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleGrantRepository for FakeRoleStore {
    async fn has_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<bool> {
        self.check(&self.fail_grants, "user_account_roles")?;
        Ok(self.grants.lock().await.iter().any(|grant| {
            grant.user_id == user_id && grant.role_name == role_name && grant.context == context
        }))
    }

    async fn insert_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<()> {
        self.check(&self.fail_grants, "user_account_roles")?;
        if !self.has_role_grant(user_id, role_name, context).await? {
            self.seed_grant(user_id, role_name, context).await;
        }
        Ok(())
    }

    async fn delete_role_grant(
        &self,
        user_id: UserId,
        role_name: &str,
        context: RoleContext,
    ) -> AppResult<u64> {
        self.check(&self.fail_grants, "user_account_roles")?;
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|grant| {
            !(grant.user_id == user_id && grant.role_name == role_name && grant.context == context)
        });
        Ok((before - grants.len()) as u64)
    }

    async fn list_role_grants_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleGrant>> {
        self.check(&self.fail_grants, "user_account_roles")?;
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_role_grants(&self, role_name: &str, context: RoleContext) -> AppResult<i64> {
        self.check(&self.fail_grants, "user_account_roles")?;
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.role_name == role_name && grant.context == context)
            .count() as i64)
    }
}

#[async_trait]
impl UserGroupRepository for FakeRoleStore {
    async fn has_site_membership(
        &self,
        user_id: UserId,
        role_id: LegacyRoleId,
    ) -> AppResult<bool> {
        self.check(&self.fail_groups, "user_groups")?;
        Ok(self.membership_count(user_id, role_id, RoleContext::Site).await > 0)
    }

    async fn count_site_memberships(&self, role_id: LegacyRoleId) -> AppResult<i64> {
        self.check(&self.fail_groups, "user_groups")?;
        let groups = self.groups.lock().await;
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|(group_id, _)| {
                groups.iter().any(|group| {
                    group.user_group_id == *group_id
                        && group.role_id == role_id
                        && group.context == RoleContext::Site
                })
            })
            .count() as i64)
    }

    async fn has_journal_membership(
        &self,
        user_id: UserId,
        journal_id: JournalId,
        role_ids: &[LegacyRoleId],
    ) -> AppResult<bool> {
        self.check(&self.fail_groups, "user_groups")?;
        for role_id in role_ids {
            if self
                .membership_count(user_id, *role_id, RoleContext::Journal(journal_id))
                .await
                > 0
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn find_user_groups(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
    ) -> AppResult<Vec<UserGroup>> {
        self.check(&self.fail_groups, "user_groups")?;
        Ok(self
            .groups
            .lock()
            .await
            .iter()
            .filter(|group| group.context == context && group.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn create_user_group(
        &self,
        context: RoleContext,
        role_id: LegacyRoleId,
        is_default: bool,
    ) -> AppResult<UserGroup> {
        self.check(&self.fail_groups, "user_groups")?;
        let group = UserGroup {
            user_group_id: self.next_group_id.fetch_add(1, Ordering::SeqCst) + 1,
            role_id,
            context,
            is_default,
        };
        self.groups.lock().await.push(group.clone());
        Ok(group)
    }

    async fn add_membership(&self, user_group_id: i64, user_id: UserId) -> AppResult<()> {
        self.check(&self.fail_groups, "user_user_groups")?;
        let mut memberships = self.memberships.lock().await;
        if !memberships.contains(&(user_group_id, user_id)) {
            memberships.push((user_group_id, user_id));
        }
        Ok(())
    }

    async fn remove_memberships(&self, user_id: UserId, user_group_ids: &[i64]) -> AppResult<u64> {
        self.check(&self.fail_groups, "user_user_groups")?;
        let mut memberships = self.memberships.lock().await;
        let before = memberships.len();
        memberships
            .retain(|(group_id, member)| !(*member == user_id && user_group_ids.contains(group_id)));
        Ok((before - memberships.len()) as u64)
    }

    async fn list_memberships_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserGroupMembership>> {
        self.check(&self.fail_groups, "user_user_groups")?;
        let groups = self.groups.lock().await;
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|(_, member)| *member == user_id)
            .filter_map(|(group_id, member)| {
                groups
                    .iter()
                    .find(|group| group.user_group_id == *group_id)
                    .map(|group| UserGroupMembership {
                        user_group_id: *group_id,
                        user_id: *member,
                        role_id: group.role_id,
                        context: group.context,
                    })
            })
            .collect())
    }
}

/// Existence lookups for accounts and journals.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub(crate) users: Mutex<HashMap<UserId, UserAccount>>,
    pub(crate) journals: Mutex<HashMap<JournalId, Journal>>,
}

impl FakeDirectory {
    pub(crate) async fn add_user(&self, user_id: UserId) {
        self.users.lock().await.insert(
            user_id,
            UserAccount {
                id: user_id,
                email: format!("{user_id}@journal.test"),
                display_name: "Member".to_owned(),
                created_at: Utc::now(),
            },
        );
    }

    pub(crate) async fn add_journal(&self, journal_id: JournalId) {
        self.add_journal_with_state(journal_id, true).await;
    }

    pub(crate) async fn add_journal_with_state(&self, journal_id: JournalId, enabled: bool) {
        let now = Utc::now();
        self.journals.lock().await.insert(
            journal_id,
            Journal {
                id: journal_id,
                path: format!("journal-{journal_id}"),
                name: "Test Journal".to_owned(),
                description: None,
                enabled,
                created_at: now,
                updated_at: now,
            },
        );
    }
}

#[async_trait]
impl UserRepository for FakeDirectory {
    async fn create_user(&self, record: NewUserRecord) -> AppResult<UserAccount> {
        let account = UserAccount {
            id: UserId::new(),
            email: record.email.into(),
            display_name: record.display_name.into(),
            created_at: Utc::now(),
        };
        self.users.lock().await.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn find_credentials_by_email(&self, _email: &str) -> AppResult<Option<UserCredentials>> {
        Ok(None)
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn update_display_name(
        &self,
        user_id: UserId,
        display_name: &str,
    ) -> AppResult<Option<UserAccount>> {
        let mut users = self.users.lock().await;
        Ok(users.get_mut(&user_id).map(|account| {
            account.display_name = display_name.to_owned();
            account.clone()
        }))
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.users.lock().await.remove(&user_id).is_some())
    }
}

#[async_trait]
impl JournalRepository for FakeDirectory {
    async fn create_journal(&self, _journal: NewJournal) -> AppResult<Journal> {
        Err(AppError::Internal(
            "journal creation is not supported by the fake directory".to_owned(),
        ))
    }

    async fn find_journal(&self, journal_id: JournalId) -> AppResult<Option<Journal>> {
        Ok(self.journals.lock().await.get(&journal_id).cloned())
    }

    async fn find_journal_by_path(&self, path: &str) -> AppResult<Option<Journal>> {
        Ok(self
            .journals
            .lock()
            .await
            .values()
            .find(|journal| journal.path == path)
            .cloned())
    }

    async fn list_journals(&self, include_disabled: bool) -> AppResult<Vec<Journal>> {
        Ok(self
            .journals
            .lock()
            .await
            .values()
            .filter(|journal| include_disabled || journal.enabled)
            .cloned()
            .collect())
    }

    async fn update_journal(
        &self,
        _journal_id: JournalId,
        _changes: JournalChanges,
    ) -> AppResult<Option<Journal>> {
        Ok(None)
    }

    async fn delete_journal(&self, journal_id: JournalId) -> AppResult<bool> {
        Ok(self.journals.lock().await.remove(&journal_id).is_some())
    }

    async fn list_journal_settings(&self, _journal_id: JournalId) -> AppResult<Vec<JournalSetting>> {
        Ok(Vec::new())
    }
}

/// Submissions, publications, issues, and review assignments.
#[derive(Default)]
pub(crate) struct FakeWorkflowStore {
    pub(crate) submissions: Mutex<Vec<Submission>>,
    pub(crate) publications: Mutex<Vec<Publication>>,
    pub(crate) issues: Mutex<Vec<Issue>>,
    pub(crate) assignments: Mutex<Vec<ReviewAssignment>>,
    next_id: AtomicI64,
}

impl FakeWorkflowStore {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn add_issue(&self, journal_id: JournalId) -> i64 {
        let id = self.next_id();
        self.issues.lock().await.push(Issue {
            id,
            journal_id,
            volume: Some(1),
            number: Some("1".to_owned()),
            year: Some(2024),
            title: None,
            published: false,
            date_published: None,
        });
        id
    }
}

#[async_trait]
impl SubmissionRepository for FakeWorkflowStore {
    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission> {
        let created = Submission {
            id: self.next_id(),
            journal_id: submission.journal_id,
            submitter_id: submission.submitter_id,
            title: submission.title.into(),
            abstract_text: submission.abstract_text,
            status: SubmissionStatus::Queued,
            stage: WorkflowStage::Submission,
            date_submitted: Utc::now(),
            current_publication_id: None,
        };
        self.submissions.lock().await.push(created.clone());
        Ok(created)
    }

    async fn find_submission(
        &self,
        submission_id: i64,
    ) -> AppResult<Option<SubmissionWithPublications>> {
        let Some(submission) = self
            .submissions
            .lock()
            .await
            .iter()
            .find(|submission| submission.id == submission_id)
            .cloned()
        else {
            return Ok(None);
        };

        let publications = self
            .publications
            .lock()
            .await
            .iter()
            .filter(|publication| publication.submission_id == submission_id)
            .cloned()
            .collect();
        Ok(Some(SubmissionWithPublications {
            submission,
            publications,
        }))
    }

    async fn list_journal_submissions(&self, journal_id: JournalId) -> AppResult<Vec<Submission>> {
        Ok(self
            .submissions
            .lock()
            .await
            .iter()
            .filter(|submission| submission.journal_id == journal_id)
            .cloned()
            .collect())
    }

    async fn list_submitter_submissions(&self, submitter_id: UserId) -> AppResult<Vec<Submission>> {
        Ok(self
            .submissions
            .lock()
            .await
            .iter()
            .filter(|submission| submission.submitter_id == submitter_id)
            .cloned()
            .collect())
    }

    async fn update_submission(
        &self,
        submission_id: i64,
        changes: SubmissionChanges,
    ) -> AppResult<Option<Submission>> {
        let mut submissions = self.submissions.lock().await;
        Ok(submissions
            .iter_mut()
            .find(|submission| submission.id == submission_id)
            .map(|submission| {
                if let Some(status) = changes.status {
                    submission.status = status;
                }
                if let Some(stage) = changes.stage {
                    submission.stage = stage;
                }
                submission.clone()
            }))
    }

    async fn create_publication(&self, publication: NewPublication) -> AppResult<Publication> {
        let mut publications = self.publications.lock().await;
        let version = publications
            .iter()
            .filter(|existing| existing.submission_id == publication.submission_id)
            .map(|existing| existing.version)
            .max()
            .unwrap_or(0)
            + 1;
        let created = Publication {
            id: self.next_id(),
            submission_id: publication.submission_id,
            version,
            title: publication.title.into(),
            status: publication.status,
            issue_id: publication.issue_id,
            date_published: publication.date_published,
        };
        publications.push(created.clone());

        if let Some(submission) = self
            .submissions
            .lock()
            .await
            .iter_mut()
            .find(|submission| submission.id == publication.submission_id)
        {
            submission.current_publication_id = Some(created.id);
        }
        Ok(created)
    }

    async fn delete_submission(&self, submission_id: i64) -> AppResult<bool> {
        let mut submissions = self.submissions.lock().await;
        let before = submissions.len();
        submissions.retain(|submission| submission.id != submission_id);
        Ok(submissions.len() < before)
    }
}

#[async_trait]
impl IssueRepository for FakeWorkflowStore {
    async fn create_issue(&self, journal_id: JournalId, fields: IssueFields) -> AppResult<Issue> {
        let issue = Issue {
            id: self.next_id(),
            journal_id,
            volume: fields.volume,
            number: fields.number,
            year: fields.year,
            title: fields.title,
            published: false,
            date_published: None,
        };
        self.issues.lock().await.push(issue.clone());
        Ok(issue)
    }

    async fn find_issue(&self, issue_id: i64) -> AppResult<Option<Issue>> {
        Ok(self
            .issues
            .lock()
            .await
            .iter()
            .find(|issue| issue.id == issue_id)
            .cloned())
    }

    async fn list_issues(&self, journal_id: JournalId, published_only: bool) -> AppResult<Vec<Issue>> {
        Ok(self
            .issues
            .lock()
            .await
            .iter()
            .filter(|issue| issue.journal_id == journal_id && (issue.published || !published_only))
            .cloned()
            .collect())
    }

    async fn update_issue(
        &self,
        issue_id: i64,
        changes: IssueChanges,
        published_at: DateTime<Utc>,
    ) -> AppResult<Option<Issue>> {
        let mut issues = self.issues.lock().await;
        Ok(issues.iter_mut().find(|issue| issue.id == issue_id).map(|issue| {
            let fields = changes.fields;
            issue.volume = fields.volume.or(issue.volume);
            issue.number = fields.number.or(issue.number.take());
            issue.year = fields.year.or(issue.year);
            issue.title = fields.title.or(issue.title.take());
            if let Some(published) = changes.published {
                if published && !issue.published {
                    issue.date_published = Some(published_at);
                }
                if !published {
                    issue.date_published = None;
                }
                issue.published = published;
            }
            issue.clone()
        }))
    }

    async fn delete_issue(&self, issue_id: i64) -> AppResult<bool> {
        let mut issues = self.issues.lock().await;
        let before = issues.len();
        issues.retain(|issue| issue.id != issue_id);
        Ok(issues.len() < before)
    }
}

#[async_trait]
impl ReviewRepository for FakeWorkflowStore {
    async fn create_assignment(&self, assignment: NewReviewAssignment) -> AppResult<ReviewAssignment> {
        let mut assignments = self.assignments.lock().await;
        if assignments.iter().any(|existing| {
            existing.submission_id == assignment.submission_id
                && existing.reviewer_id == assignment.reviewer_id
        }) {
            return Err(AppError::Conflict("reviewer already assigned".to_owned()));
        }

        let created = ReviewAssignment {
            id: self.next_id(),
            submission_id: assignment.submission_id,
            reviewer_id: assignment.reviewer_id,
            status: ReviewStatus::Pending,
            recommendation: None,
            date_assigned: Utc::now(),
            date_due: assignment.date_due,
            date_completed: None,
        };
        assignments.push(created.clone());
        Ok(created)
    }

    async fn find_assignment(&self, assignment_id: i64) -> AppResult<Option<ReviewAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .find(|assignment| assignment.id == assignment_id)
            .cloned())
    }

    async fn find_assignment_for_reviewer(
        &self,
        submission_id: i64,
        reviewer_id: UserId,
    ) -> AppResult<Option<ReviewAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .find(|assignment| {
                assignment.submission_id == submission_id && assignment.reviewer_id == reviewer_id
            })
            .cloned())
    }

    async fn list_submission_assignments(&self, submission_id: i64) -> AppResult<Vec<ReviewAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| assignment.submission_id == submission_id)
            .cloned()
            .collect())
    }

    async fn list_reviewer_assignments(&self, reviewer_id: UserId) -> AppResult<Vec<ReviewAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| assignment.reviewer_id == reviewer_id)
            .cloned()
            .collect())
    }

    async fn transition_assignment(
        &self,
        assignment_id: i64,
        transition: ReviewTransition,
    ) -> AppResult<Option<ReviewAssignment>> {
        let mut assignments = self.assignments.lock().await;
        Ok(assignments
            .iter_mut()
            .find(|assignment| {
                assignment.id == assignment_id && assignment.status == transition.from
            })
            .map(|assignment| {
                assignment.status = transition.status;
                assignment.recommendation = transition.recommendation;
                assignment.date_completed = transition.date_completed;
                assignment.clone()
            }))
    }

    async fn delete_assignment(&self, assignment_id: i64) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| assignment.id != assignment_id);
        Ok(assignments.len() < before)
    }
}
