use chrono::{DateTime, Utc};
use folio_application::{
    Announcement, AnnouncementQuery, CreateAnnouncementInput, Issue, IssueChanges, IssueFields,
    UpdateAnnouncementInput,
};
use folio_core::{AppResult, JournalId};
use folio_domain::RoleContext;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::parse_timestamp;

fn role_context(journal_id: Option<i64>) -> AppResult<RoleContext> {
    match journal_id {
        Some(journal_id) => Ok(RoleContext::Journal(JournalId::new(journal_id)?)),
        None => Ok(RoleContext::Site),
    }
}

fn optional_timestamp(field: &str, value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value.map(|value| parse_timestamp(field, &value)).transpose()
}

/// Incoming payload for posting an announcement. Without `journal_id` it is site-wide.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-announcement-request.ts"
)]
pub struct CreateAnnouncementRequest {
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub date_expire: Option<String>,
}

impl CreateAnnouncementRequest {
    pub fn into_input(self) -> AppResult<CreateAnnouncementInput> {
        Ok(CreateAnnouncementInput {
            context: role_context(self.journal_id)?,
            title: self.title,
            short_description: self.short_description,
            description: self.description,
            date_expire: optional_timestamp("date_expire", self.date_expire)?,
        })
    }
}

/// Incoming payload for a partial announcement update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-announcement-request.ts"
)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub date_expire: Option<String>,
}

impl UpdateAnnouncementRequest {
    pub fn into_input(self) -> AppResult<UpdateAnnouncementInput> {
        Ok(UpdateAnnouncementInput {
            title: self.title,
            short_description: self.short_description,
            description: self.description,
            date_expire: optional_timestamp("date_expire", self.date_expire)?,
        })
    }
}

/// Query string of the announcement listing.
#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementListQuery {
    pub journal_id: Option<i64>,
    #[serde(default)]
    pub site_only: bool,
    #[serde(default)]
    pub include_expired: bool,
}

impl AnnouncementListQuery {
    pub fn into_query(self) -> AppResult<AnnouncementQuery> {
        let context = match (self.journal_id, self.site_only) {
            (Some(journal_id), _) => Some(RoleContext::Journal(JournalId::new(journal_id)?)),
            (None, true) => Some(RoleContext::Site),
            (None, false) => None,
        };

        Ok(AnnouncementQuery {
            context,
            include_expired: self.include_expired,
        })
    }
}

/// API representation of an announcement.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/announcement-response.ts"
)]
pub struct AnnouncementResponse {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number | null")]
    pub journal_id: Option<i64>,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub date_posted: String,
    pub date_expire: Option<String>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(value: Announcement) -> Self {
        Self {
            id: value.id,
            journal_id: value.context.flat_context_id(),
            title: value.title,
            short_description: value.short_description,
            description: value.description,
            date_posted: value.date_posted.to_rfc3339(),
            date_expire: value.date_expire.map(|expire| expire.to_rfc3339()),
        }
    }
}

/// Incoming payload for creating or updating an issue.
///
/// `published` is ignored on creation; new issues start unpublished.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issue-request.ts"
)]
pub struct IssueRequest {
    pub volume: Option<i32>,
    pub number: Option<String>,
    pub year: Option<i32>,
    pub title: Option<String>,
    pub published: Option<bool>,
}

impl IssueRequest {
    pub fn fields(&self) -> IssueFields {
        IssueFields {
            volume: self.volume,
            number: self.number.clone(),
            year: self.year,
            title: self.title.clone(),
        }
    }
}

impl From<IssueRequest> for IssueChanges {
    fn from(value: IssueRequest) -> Self {
        Self {
            fields: value.fields(),
            published: value.published,
        }
    }
}

/// API representation of an issue.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issue-response.ts"
)]
pub struct IssueResponse {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub journal_id: i64,
    pub volume: Option<i32>,
    pub number: Option<String>,
    pub year: Option<i32>,
    pub title: Option<String>,
    pub published: bool,
    pub date_published: Option<String>,
}

impl From<Issue> for IssueResponse {
    fn from(value: Issue) -> Self {
        Self {
            id: value.id,
            journal_id: value.journal_id.as_i64(),
            volume: value.volume,
            number: value.number,
            year: value.year,
            title: value.title,
            published: value.published,
            date_published: value.date_published.map(|date| date.to_rfc3339()),
        }
    }
}
