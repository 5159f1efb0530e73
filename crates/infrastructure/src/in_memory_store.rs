use std::collections::{BTreeMap, BTreeSet, HashMap};

use tokio::sync::RwLock;

use folio_application::{
    Announcement, Issue, Journal, Publication, ReviewAssignment, RoleGrant, Submission,
    UserAccount, UserGroup,
};
use folio_core::{JournalId, UserId};

mod accounts;
mod content;
mod roles;
mod workflow;

#[cfg(test)]
mod tests;

/// In-memory implementation of every repository port.
///
/// Deleting a user or a journal removes the rows that PostgreSQL would
/// cascade, so services behave the same against both backends.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, StoredUser>,
    journals: BTreeMap<JournalId, Journal>,
    journal_settings: BTreeMap<(JournalId, String), String>,
    grants: Vec<RoleGrant>,
    groups: BTreeMap<i64, UserGroup>,
    memberships: BTreeSet<(i64, UserId)>,
    announcements: BTreeMap<i64, Announcement>,
    issues: BTreeMap<i64, Issue>,
    submissions: BTreeMap<i64, Submission>,
    publications: BTreeMap<i64, Publication>,
    assignments: BTreeMap<i64, ReviewAssignment>,
    last_id: i64,
}

#[derive(Debug, Clone)]
struct StoredUser {
    account: UserAccount,
    password_hash: String,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove_submission_rows(&mut self, submission_id: i64) {
        self.submissions.remove(&submission_id);
        self.publications
            .retain(|_, publication| publication.submission_id != submission_id);
        self.assignments
            .retain(|_, assignment| assignment.submission_id != submission_id);
    }
}
