pub mod announcements;
pub mod health;
pub mod issues;
pub mod journals;
pub mod reviews;
pub mod roles;
pub mod submissions;
pub mod users;

use folio_core::{AppResult, JournalId, UserId};


fn parse_user_id(value: &str) -> AppResult<UserId> {
    value.parse::<UserId>()
}

fn parse_journal_id(value: i64) -> AppResult<JournalId> {
    JournalId::new(value)
}
