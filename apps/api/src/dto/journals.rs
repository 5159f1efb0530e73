use folio_application::{CreateJournalInput, Journal, JournalSetting, UpdateJournalInput};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for journal creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-journal-request.ts"
)]
pub struct CreateJournalRequest {
    pub path: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<CreateJournalRequest> for CreateJournalInput {
    fn from(value: CreateJournalRequest) -> Self {
        Self {
            path: value.path,
            name: value.name,
            description: value.description,
            enabled: value.enabled,
        }
    }
}

/// Incoming payload for a partial journal update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-journal-request.ts"
)]
pub struct UpdateJournalRequest {
    pub path: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

impl From<UpdateJournalRequest> for UpdateJournalInput {
    fn from(value: UpdateJournalRequest) -> Self {
        Self {
            path: value.path,
            name: value.name,
            description: value.description,
            enabled: value.enabled,
        }
    }
}

/// API representation of a journal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/journal-response.ts"
)]
pub struct JournalResponse {
    #[ts(type = "number")]
    pub id: i64,
    pub path: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Journal> for JournalResponse {
    fn from(value: Journal) -> Self {
        Self {
            id: value.id.as_i64(),
            path: value.path,
            name: value.name,
            description: value.description,
            enabled: value.enabled,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// One journal setting.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/journal-setting-response.ts"
)]
pub struct JournalSettingResponse {
    pub setting_name: String,
    pub setting_value: String,
}

impl From<JournalSetting> for JournalSettingResponse {
    fn from(value: JournalSetting) -> Self {
        Self {
            setting_name: value.setting_name,
            setting_value: value.setting_value,
        }
    }
}
